//! # Shader Program Wrapper
//!
//! Owns the compile-and-link lifecycle of a shader program and exposes
//! typed uniform setters addressed by GLSL name, including nested and
//! indexed names such as `pointLights[2].quadratic`.
//!
//! Uniform locations are looked up once per name and cached, including
//! negative results. Setting a uniform the program never declared is a
//! silent no-op so one renderer can drive shaders of varying
//! complexity; a debug-build warning (once per name) points out the
//! likely typos.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::{
    DeviceError, ProgramHandle, RenderDevice, ShaderStage, ShaderStageHandle, UniformLocation,
    UniformValue,
};

/// Errors from building or using a shader program
#[derive(Debug, Error)]
pub enum ShaderError {
    /// A shader source file could not be read
    #[error("failed to read shader source {path:?}")]
    Io {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },

    /// A stage failed to compile; `log` holds the driver output
    #[error("{stage} shader compilation failed:\n{log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler log text
        log: String,
    },

    /// The program failed to link; `log` holds the driver output
    #[error("shader program linking failed:\n{log}")]
    Link {
        /// Linker log text
        log: String,
    },

    /// The device rejected an operation for another reason
    #[error("render device error")]
    Device(#[from] DeviceError),
}

/// Compiled and linked shader program with a uniform location cache
#[derive(Debug)]
pub struct ShaderProgram {
    handle: ProgramHandle,
    locations: HashMap<String, Option<UniformLocation>>,
    warn_missing: bool,
}

impl ShaderProgram {
    /// Build a program from vertex and fragment source files, with an
    /// optional geometry stage
    ///
    /// # Arguments
    /// * `device` - Device that compiles and links the stages
    /// * `vertex_path` - Path to the vertex shader source
    /// * `fragment_path` - Path to the fragment shader source
    /// * `geometry_path` - Optional path to a geometry shader source
    pub fn from_files(
        device: &mut dyn RenderDevice,
        vertex_path: &Path,
        fragment_path: &Path,
        geometry_path: Option<&Path>,
    ) -> Result<Self, ShaderError> {
        log::debug!(
            "Loading shader program from {:?} + {:?}",
            vertex_path,
            fragment_path
        );

        let vertex_src = read_source(vertex_path)?;
        let fragment_src = read_source(fragment_path)?;
        let geometry_src = match geometry_path {
            Some(path) => Some(read_source(path)?),
            None => None,
        };

        Self::from_sources(device, &vertex_src, &fragment_src, geometry_src.as_deref())
    }

    /// Build a program from in-memory GLSL sources
    ///
    /// Compiles each stage, links them, and releases the intermediate
    /// stage handles. The first stage to fail aborts the build and the
    /// error carries that stage's compiler log.
    pub fn from_sources(
        device: &mut dyn RenderDevice,
        vertex_src: &str,
        fragment_src: &str,
        geometry_src: Option<&str>,
    ) -> Result<Self, ShaderError> {
        let mut sources = vec![
            (ShaderStage::Vertex, vertex_src),
            (ShaderStage::Fragment, fragment_src),
        ];
        if let Some(source) = geometry_src {
            sources.push((ShaderStage::Geometry, source));
        }

        let mut stages: Vec<ShaderStageHandle> = Vec::with_capacity(sources.len());
        for (stage, source) in sources {
            match compile_stage(device, stage, source) {
                Ok(handle) => stages.push(handle),
                Err(err) => {
                    release_stages(device, &stages);
                    return Err(err);
                }
            }
        }

        let handle = match device.link_program(&stages) {
            Ok(handle) => handle,
            Err(DeviceError::Link { log }) => {
                release_stages(device, &stages);
                return Err(ShaderError::Link { log });
            }
            Err(other) => {
                release_stages(device, &stages);
                return Err(ShaderError::Device(other));
            }
        };
        release_stages(device, &stages);

        log::info!("Shader program {} linked", handle.0);
        Ok(Self {
            handle,
            locations: HashMap::new(),
            warn_missing: cfg!(debug_assertions),
        })
    }

    /// Device handle of the linked program
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Make this program the active one on the device
    ///
    /// Uniform setters only take effect while their program is active.
    pub fn bind(&self, device: &mut dyn RenderDevice) -> Result<(), ShaderError> {
        device.use_program(self.handle)?;
        Ok(())
    }

    /// Enable or disable the missing-uniform warning
    ///
    /// Defaults to on in debug builds and off in release builds.
    pub fn set_warn_missing(&mut self, enabled: bool) {
        self.warn_missing = enabled;
    }

    /// Set an `int` or `sampler2D` uniform
    pub fn set_int(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        value: i32,
    ) -> Result<(), ShaderError> {
        self.set_value(device, name, UniformValue::Int(value))
    }

    /// Set a `float` uniform
    pub fn set_float(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        value: f32,
    ) -> Result<(), ShaderError> {
        self.set_value(device, name, UniformValue::Float(value))
    }

    /// Set a `vec3` uniform
    pub fn set_vec3(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        value: Vec3,
    ) -> Result<(), ShaderError> {
        self.set_value(device, name, UniformValue::Vec3(value.into()))
    }

    /// Set a `vec4` uniform
    pub fn set_vec4(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        value: Vec4,
    ) -> Result<(), ShaderError> {
        self.set_value(device, name, UniformValue::Vec4(value.into()))
    }

    /// Set a `mat4` uniform in column-major order
    pub fn set_mat4(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        value: &Mat4,
    ) -> Result<(), ShaderError> {
        let mut columns = [0.0f32; 16];
        columns.copy_from_slice(value.as_slice());
        self.set_value(device, name, UniformValue::Mat4(columns))
    }

    fn set_value(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        value: UniformValue,
    ) -> Result<(), ShaderError> {
        match self.location(device, name)? {
            Some(location) => {
                device.set_uniform(location, value)?;
                Ok(())
            }
            // Name the program never declared, or one the compiler
            // stripped as unused: drop the write without complaint
            None => Ok(()),
        }
    }

    /// Resolve a uniform name through the cache
    ///
    /// Unknown names cache as `None` so each one is looked up, and
    /// warned about, at most once per program.
    fn location(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
    ) -> Result<Option<UniformLocation>, ShaderError> {
        if let Some(cached) = self.locations.get(name) {
            return Ok(*cached);
        }

        let resolved = device.uniform_location(self.handle, name)?;
        if resolved.is_none() && self.warn_missing {
            log::warn!(
                "Uniform '{}' not found in shader program {}",
                name,
                self.handle.0
            );
        }
        self.locations.insert(name.to_string(), resolved);
        Ok(resolved)
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn compile_stage(
    device: &mut dyn RenderDevice,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderStageHandle, ShaderError> {
    device.compile_shader(stage, source).map_err(|err| match err {
        DeviceError::Compile { stage, log } => ShaderError::Compile { stage, log },
        other => ShaderError::Device(other),
    })
}

fn release_stages(device: &mut dyn RenderDevice, stages: &[ShaderStageHandle]) {
    for &stage in stages {
        device.delete_shader(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessDevice;

    const VERTEX_SRC: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
    const FRAGMENT_SRC: &str = "#version 330 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";
    const BROKEN_FRAGMENT_SRC: &str = "#version 330 core\nvoid main() { color = vec4(1.0);\n";

    #[test]
    fn test_compile_error_carries_stage_and_log() {
        let mut device = HeadlessDevice::new();
        let result = ShaderProgram::from_sources(&mut device, VERTEX_SRC, BROKEN_FRAGMENT_SRC, None);

        match result {
            Err(ShaderError::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("unbalanced braces"));
            }
            other => panic!("Expected fragment compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_sources_links_and_binds() {
        let mut device = HeadlessDevice::new();
        let program =
            ShaderProgram::from_sources(&mut device, VERTEX_SRC, FRAGMENT_SRC, None).unwrap();

        program.bind(&mut device).unwrap();
        assert_eq!(device.active_program(), Some(program.handle()));
    }

    #[test]
    fn test_unknown_uniform_is_silent_noop() {
        let mut device = HeadlessDevice::with_uniform_names(["viewPos"]);
        let mut program =
            ShaderProgram::from_sources(&mut device, VERTEX_SRC, FRAGMENT_SRC, None).unwrap();
        program.bind(&mut device).unwrap();

        program.set_float(&mut device, "viewPoss", 1.0).unwrap();
        program.set_float(&mut device, "viewPoss", 2.0).unwrap();
        assert!(device.uniform_writes().is_empty());

        program
            .set_vec3(&mut device, "viewPos", Vec3::new(1.0, 2.0, 3.0))
            .unwrap();
        let writes = device.uniform_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].name, "viewPos");
    }

    #[test]
    fn test_nested_and_indexed_names_reach_device() {
        let mut device = HeadlessDevice::new();
        let mut program =
            ShaderProgram::from_sources(&mut device, VERTEX_SRC, FRAGMENT_SRC, None).unwrap();
        program.bind(&mut device).unwrap();

        program
            .set_float(&mut device, "pointLights[2].quadratic", 0.032)
            .unwrap();
        program.set_int(&mut device, "material.diffuse1", 0).unwrap();
        program.set_mat4(&mut device, "model", &Mat4::identity()).unwrap();

        let writes = device.uniform_writes();
        assert_eq!(writes[0].name, "pointLights[2].quadratic");
        assert_eq!(writes[0].value, UniformValue::Float(0.032));
        assert_eq!(writes[1].name, "material.diffuse1");
        assert_eq!(writes[1].value, UniformValue::Int(0));
        match &writes[2].value {
            UniformValue::Mat4(columns) => {
                assert_eq!(columns[0], 1.0);
                assert_eq!(columns[5], 1.0);
                assert_eq!(columns[1], 0.0);
            }
            other => panic!("Expected mat4 write, got {:?}", other),
        }
    }

    #[test]
    fn test_from_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let vertex_path = dir.path().join("basic.vert");
        let fragment_path = dir.path().join("basic.frag");
        std::fs::write(&vertex_path, VERTEX_SRC).unwrap();
        std::fs::write(&fragment_path, FRAGMENT_SRC).unwrap();

        let mut device = HeadlessDevice::new();
        let program =
            ShaderProgram::from_files(&mut device, &vertex_path, &fragment_path, None).unwrap();
        assert!(program.handle().0 > 0);

        let missing = dir.path().join("nope.vert");
        match ShaderProgram::from_files(&mut device, &missing, &fragment_path, None) {
            Err(ShaderError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("Expected io error, got {:?}", other),
        }
    }
}
