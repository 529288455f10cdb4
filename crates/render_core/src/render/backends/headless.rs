//! Headless device for tests and windowless runs
//!
//! Implements [`RenderDevice`] with in-memory bookkeeping instead of a
//! GPU: handles are validated, shader sources get lexical checks with
//! driver-style logs, uniform locations are handed out on demand (or
//! restricted to a declared name set), and every upload, draw, and
//! uniform write is recorded so callers can assert on what reached the
//! device.

use std::collections::{HashMap, HashSet};

use crate::render::api::{
    BufferHandle, DeviceError, DeviceResult, ProgramHandle, RenderDevice, ShaderStage,
    ShaderStageHandle, TextureDescriptor, TextureHandle, UniformLocation, UniformValue,
};

/// Counters of work submitted to the device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Shader stages compiled
    pub stage_compiles: u32,
    /// Programs linked
    pub programs_linked: u32,
    /// Textures created and filled
    pub texture_uploads: u32,
    /// Vertex and index buffers created
    pub buffers_created: u32,
    /// Indexed draw calls issued
    pub draw_calls: u32,
    /// Uniform values written
    pub uniform_writes: u32,
}

/// One recorded uniform write, resolved back to its name
#[derive(Debug, Clone, PartialEq)]
pub struct UniformWrite {
    /// Program the write went to
    pub program: ProgramHandle,
    /// Uniform name the location was looked up under
    pub name: String,
    /// Value written
    pub value: UniformValue,
}

struct ProgramRecord {
    by_name: HashMap<String, i32>,
    by_location: HashMap<i32, String>,
    next_location: i32,
}

impl ProgramRecord {
    fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            by_location: HashMap::new(),
            next_location: 0,
        }
    }

    fn resolve(&mut self, name: &str) -> UniformLocation {
        if let Some(&location) = self.by_name.get(name) {
            return UniformLocation(location);
        }
        let location = self.next_location;
        self.next_location += 1;
        self.by_name.insert(name.to_string(), location);
        self.by_location.insert(location, name.to_string());
        UniformLocation(location)
    }
}

/// Recording implementation of [`RenderDevice`]
pub struct HeadlessDevice {
    next_id: u32,
    shaders: HashMap<u32, ShaderStage>,
    programs: HashMap<u32, ProgramRecord>,
    textures: HashMap<u32, TextureDescriptor>,
    vertex_buffers: HashMap<u32, usize>,
    index_buffers: HashMap<u32, usize>,
    active_program: Option<ProgramHandle>,
    bound_vertex_buffer: Option<BufferHandle>,
    bound_index_buffer: Option<BufferHandle>,
    bound_textures: HashMap<u32, TextureHandle>,
    declared_uniforms: Option<HashSet<String>>,
    uniform_log: Vec<UniformWrite>,
    stats: DeviceStats,
    viewport: (u32, u32),
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Create a permissive device: every uniform name resolves to a
    /// location, matching a driver that kept all declared uniforms
    pub fn new() -> Self {
        Self {
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            vertex_buffers: HashMap::new(),
            index_buffers: HashMap::new(),
            active_program: None,
            bound_vertex_buffer: None,
            bound_index_buffer: None,
            bound_textures: HashMap::new(),
            declared_uniforms: None,
            uniform_log: Vec::new(),
            stats: DeviceStats::default(),
            viewport: (0, 0),
        }
    }

    /// Create a device that only resolves the given uniform names,
    /// the way a driver exposes exactly what a program declares
    pub fn with_uniform_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut device = Self::new();
        device.declared_uniforms = Some(names.into_iter().map(Into::into).collect());
        device
    }

    /// Work counters
    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// Every uniform write in submission order
    pub fn uniform_writes(&self) -> &[UniformWrite] {
        &self.uniform_log
    }

    /// Currently active program
    pub fn active_program(&self) -> Option<ProgramHandle> {
        self.active_program
    }

    /// Texture bound to the given unit, if any
    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.bound_textures.get(&unit).copied()
    }

    /// Vertex buffer bound for the next draw, if any
    pub fn bound_vertex_buffer(&self) -> Option<BufferHandle> {
        self.bound_vertex_buffer
    }

    /// Index buffer bound for the next draw, if any
    pub fn bound_index_buffer(&self) -> Option<BufferHandle> {
        self.bound_index_buffer
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Lexical plausibility checks standing in for a real compiler;
    /// failures produce a driver-style log line
    fn check_source(stage: ShaderStage, source: &str) -> Result<(), String> {
        if source.trim().is_empty() {
            return Err(format!("0:1: error: empty {} shader source", stage));
        }
        if !source.contains("main") {
            return Err(format!("0:1: error: no entry point 'main' in {} shader", stage));
        }
        let opens = source.chars().filter(|&c| c == '{').count();
        let closes = source.chars().filter(|&c| c == '}').count();
        if opens != closes {
            return Err(format!(
                "0:{}: error: syntax error, unbalanced braces ({} opening, {} closing)",
                source.lines().count(),
                opens,
                closes
            ));
        }
        Ok(())
    }
}

impl RenderDevice for HeadlessDevice {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> DeviceResult<ShaderStageHandle> {
        Self::check_source(stage, source).map_err(|log| DeviceError::Compile { stage, log })?;

        let id = self.alloc_id();
        self.shaders.insert(id, stage);
        self.stats.stage_compiles += 1;
        log::trace!("Compiled {} shader stage as handle {}", stage, id);
        Ok(ShaderStageHandle(id))
    }

    fn link_program(&mut self, stages: &[ShaderStageHandle]) -> DeviceResult<ProgramHandle> {
        let mut kinds = Vec::with_capacity(stages.len());
        for handle in stages {
            let stage = self.shaders.get(&handle.0).ok_or(DeviceError::InvalidHandle {
                kind: "shader stage",
                id: handle.0,
            })?;
            kinds.push(*stage);
        }

        if !kinds.contains(&ShaderStage::Vertex) || !kinds.contains(&ShaderStage::Fragment) {
            return Err(DeviceError::Link {
                log: "link failed: program requires a vertex and a fragment stage".to_string(),
            });
        }

        let id = self.alloc_id();
        self.programs.insert(id, ProgramRecord::new());
        self.stats.programs_linked += 1;
        log::trace!("Linked program {} from {} stages", id, stages.len());
        Ok(ProgramHandle(id))
    }

    fn delete_shader(&mut self, stage: ShaderStageHandle) {
        self.shaders.remove(&stage.0);
    }

    fn use_program(&mut self, program: ProgramHandle) -> DeviceResult<()> {
        if !self.programs.contains_key(&program.0) {
            return Err(DeviceError::InvalidHandle {
                kind: "program",
                id: program.0,
            });
        }
        self.active_program = Some(program);
        Ok(())
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> DeviceResult<Option<UniformLocation>> {
        if let Some(declared) = &self.declared_uniforms {
            if !declared.contains(name) {
                return Ok(None);
            }
        }
        let record = self.programs.get_mut(&program.0).ok_or(DeviceError::InvalidHandle {
            kind: "program",
            id: program.0,
        })?;
        Ok(Some(record.resolve(name)))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> DeviceResult<()> {
        let program = self.active_program.ok_or(DeviceError::InvalidHandle {
            kind: "program",
            id: 0,
        })?;
        let record = self.programs.get(&program.0).ok_or(DeviceError::InvalidHandle {
            kind: "program",
            id: program.0,
        })?;
        let name = record.by_location.get(&location.0).ok_or(DeviceError::InvalidHandle {
            kind: "uniform location",
            id: location.0.unsigned_abs(),
        })?;

        self.uniform_log.push(UniformWrite {
            program,
            name: name.clone(),
            value,
        });
        self.stats.uniform_writes += 1;
        Ok(())
    }

    fn create_texture(&mut self, desc: &TextureDescriptor, pixels: &[u8]) -> DeviceResult<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(DeviceError::Upload {
                reason: format!("zero-sized texture {}x{}", desc.width, desc.height),
            });
        }
        let expected = desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(DeviceError::Upload {
                reason: format!(
                    "{}x{} {:?} needs {} bytes, got {}",
                    desc.width,
                    desc.height,
                    desc.format,
                    expected,
                    pixels.len()
                ),
            });
        }

        let id = self.alloc_id();
        self.textures.insert(id, *desc);
        self.stats.texture_uploads += 1;
        log::trace!("Uploaded {}x{} texture as handle {}", desc.width, desc.height, id);
        Ok(TextureHandle(id))
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> DeviceResult<()> {
        if !self.textures.contains_key(&texture.0) {
            return Err(DeviceError::InvalidHandle {
                kind: "texture",
                id: texture.0,
            });
        }
        self.bound_textures.insert(unit, texture);
        Ok(())
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> DeviceResult<BufferHandle> {
        let id = self.alloc_id();
        self.vertex_buffers.insert(id, data.len());
        self.stats.buffers_created += 1;
        Ok(BufferHandle(id))
    }

    fn create_index_buffer(&mut self, data: &[u8]) -> DeviceResult<BufferHandle> {
        let id = self.alloc_id();
        self.index_buffers.insert(id, data.len());
        self.stats.buffers_created += 1;
        Ok(BufferHandle(id))
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<()> {
        if !self.vertex_buffers.contains_key(&buffer.0) {
            return Err(DeviceError::InvalidHandle {
                kind: "vertex buffer",
                id: buffer.0,
            });
        }
        self.bound_vertex_buffer = Some(buffer);
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<()> {
        if !self.index_buffers.contains_key(&buffer.0) {
            return Err(DeviceError::InvalidHandle {
                kind: "index buffer",
                id: buffer.0,
            });
        }
        self.bound_index_buffer = Some(buffer);
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) -> DeviceResult<()> {
        self.stats.draw_calls += 1;
        log::trace!("Draw call {} with {} indices", self.stats.draw_calls, index_count);
        Ok(())
    }

    fn clear(&mut self, _r: f32, _g: f32, _b: f32, _a: f32) {}

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{FilterMode, TextureFormat, TextureParams, WrapMode};

    const GOOD_VERTEX: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
    const GOOD_FRAGMENT: &str = "#version 330 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";

    fn link_test_program(device: &mut HeadlessDevice) -> ProgramHandle {
        let vs = device.compile_shader(ShaderStage::Vertex, GOOD_VERTEX).unwrap();
        let fs = device.compile_shader(ShaderStage::Fragment, GOOD_FRAGMENT).unwrap();
        device.link_program(&[vs, fs]).unwrap()
    }

    #[test]
    fn test_compile_rejects_unbalanced_braces() {
        let mut device = HeadlessDevice::new();
        let result = device.compile_shader(ShaderStage::Fragment, "void main() { broken");
        match result {
            Err(DeviceError::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("unbalanced braces"));
            }
            other => panic!("Expected compile error, got {:?}", other),
        }
        assert_eq!(device.stats().stage_compiles, 0);
    }

    #[test]
    fn test_compile_rejects_missing_entry_point() {
        let mut device = HeadlessDevice::new();
        let result = device.compile_shader(ShaderStage::Vertex, "#version 330 core\n");
        match result {
            Err(DeviceError::Compile { log, .. }) => assert!(log.contains("main")),
            other => panic!("Expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_link_requires_vertex_and_fragment() {
        let mut device = HeadlessDevice::new();
        let vs = device.compile_shader(ShaderStage::Vertex, GOOD_VERTEX).unwrap();
        match device.link_program(&[vs]) {
            Err(DeviceError::Link { log }) => assert!(log.contains("fragment")),
            other => panic!("Expected link error, got {:?}", other),
        }
    }

    #[test]
    fn test_uniform_location_permissive_mode() {
        let mut device = HeadlessDevice::new();
        let program = link_test_program(&mut device);

        let first = device.uniform_location(program, "material.shininess").unwrap();
        let again = device.uniform_location(program, "material.shininess").unwrap();
        let other = device.uniform_location(program, "viewPos").unwrap();

        assert!(first.is_some());
        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn test_uniform_location_respects_declared_names() {
        let mut device = HeadlessDevice::with_uniform_names(["viewPos"]);
        let program = link_test_program(&mut device);

        assert!(device.uniform_location(program, "viewPos").unwrap().is_some());
        assert!(device.uniform_location(program, "missing").unwrap().is_none());
    }

    #[test]
    fn test_set_uniform_requires_active_program() {
        let mut device = HeadlessDevice::new();
        let program = link_test_program(&mut device);
        let location = device.uniform_location(program, "viewPos").unwrap().unwrap();

        assert!(device.set_uniform(location, UniformValue::Float(1.0)).is_err());

        device.use_program(program).unwrap();
        device.set_uniform(location, UniformValue::Float(1.0)).unwrap();

        let writes = device.uniform_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].name, "viewPos");
        assert_eq!(writes[0].value, UniformValue::Float(1.0));
    }

    #[test]
    fn test_texture_upload_validates_data_size() {
        let mut device = HeadlessDevice::new();
        let desc = TextureDescriptor {
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8,
            params: TextureParams {
                filter: FilterMode::Linear,
                wrap: WrapMode::Repeat,
                generate_mipmaps: true,
            },
        };

        match device.create_texture(&desc, &[0u8; 3]) {
            Err(DeviceError::Upload { reason }) => assert!(reason.contains("16 bytes")),
            other => panic!("Expected upload rejection, got {:?}", other),
        }

        let handle = device.create_texture(&desc, &[0u8; 16]).unwrap();
        assert_eq!(device.stats().texture_uploads, 1);
        device.bind_texture(0, handle).unwrap();
        assert_eq!(device.bound_texture(0), Some(handle));
    }

    #[test]
    fn test_draw_and_buffer_counters() {
        let mut device = HeadlessDevice::new();
        let vbo = device.create_vertex_buffer(&[0u8; 32]).unwrap();
        let ibo = device.create_index_buffer(&[0u8; 12]).unwrap();
        device.bind_vertex_buffer(vbo).unwrap();
        device.bind_index_buffer(ibo).unwrap();
        device.draw_indexed(3).unwrap();

        let stats = device.stats();
        assert_eq!(stats.buffers_created, 2);
        assert_eq!(stats.draw_calls, 1);
    }
}
