//! Device abstraction for GPU-facing operations
//!
//! The trait covers exactly the surface the core uses: shader stage
//! compilation and program linking, uniform location lookup and writes,
//! texture and buffer creation, and indexed draws. Backends implement it
//! against a real graphics API; the shipped [`HeadlessDevice`] records
//! the calls for tests and headless runs.
//!
//! [`HeadlessDevice`]: crate::render::backends::HeadlessDevice

use std::fmt;
use thiserror::Error;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Handle to a compiled shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderStageHandle(pub u32);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Handle to a texture resource stored on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Handle to a vertex or index buffer stored on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Location of a uniform within a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Programmable pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
    /// Optional geometry stage
    Geometry,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
            Self::Geometry => write!(f, "geometry"),
        }
    }
}

/// Pixel layout of texture data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// 3 channels, 8 bits each
    Rgb8,
    /// 4 channels, 8 bits each
    Rgba8,
}

impl TextureFormat {
    /// Bytes per pixel for this format
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Linear interpolation between texels
    Linear,
    /// Nearest texel
    Nearest,
}

/// Texture coordinate wrapping behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Repeat the texture
    Repeat,
    /// Clamp coordinates to the edge texel
    ClampToEdge,
}

/// Sampling parameters applied at texture creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    /// Sampling filter
    pub filter: FilterMode,
    /// Coordinate wrapping
    pub wrap: WrapMode,
    /// Whether a mipmap chain is generated after upload
    pub generate_mipmaps: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            filter: FilterMode::Linear,
            wrap: WrapMode::Repeat,
            generate_mipmaps: true,
        }
    }
}

/// Everything the device needs to allocate and fill a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel layout of the upload data
    pub format: TextureFormat,
    /// Sampling parameters
    pub params: TextureParams,
}

/// A typed uniform value addressed by location
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Signed integer (also used for sampler unit indices)
    Int(i32),
    /// Single float
    Float(f32),
    /// 3-component vector
    Vec3([f32; 3]),
    /// 4-component vector
    Vec4([f32; 4]),
    /// 4x4 matrix, 16 floats in column-major order
    Mat4([f32; 16]),
}

/// Device operation failures
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A shader stage did not compile; `log` carries the compiler output
    #[error("{stage} shader failed to compile: {log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler diagnostic log
        log: String,
    },
    /// Program linking failed; `log` carries the linker output
    #[error("shader program failed to link: {log}")]
    Link {
        /// Linker diagnostic log
        log: String,
    },
    /// A handle did not name a live resource
    #[error("invalid {kind} handle {id}")]
    InvalidHandle {
        /// Resource kind the handle was supposed to name
        kind: &'static str,
        /// Raw handle value
        id: u32,
    },
    /// Upload data did not match the descriptor
    #[error("texture upload rejected: {reason}")]
    Upload {
        /// What was wrong with the data
        reason: String,
    },
}

/// GPU device operations used by the rendering core
///
/// All methods take `&mut self`; the execution model is single-threaded
/// and resources are written once at creation time.
pub trait RenderDevice {
    /// Compile one shader stage from source text
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> DeviceResult<ShaderStageHandle>;

    /// Link compiled stages into a program
    fn link_program(&mut self, stages: &[ShaderStageHandle]) -> DeviceResult<ProgramHandle>;

    /// Release a compiled stage (programs keep working after their stages
    /// are deleted, matching GPU driver behavior)
    fn delete_shader(&mut self, stage: ShaderStageHandle);

    /// Make a program the active one for subsequent uniform writes and draws
    fn use_program(&mut self, program: ProgramHandle) -> DeviceResult<()>;

    /// Look up a uniform location by name; `Ok(None)` means the program
    /// declares no such uniform
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> DeviceResult<Option<UniformLocation>>;

    /// Write a uniform value at a previously looked-up location
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> DeviceResult<()>;

    /// Allocate a texture, upload pixel data, and generate mipmaps when
    /// the descriptor asks for them
    fn create_texture(&mut self, desc: &TextureDescriptor, pixels: &[u8]) -> DeviceResult<TextureHandle>;

    /// Bind a texture to the given texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> DeviceResult<()>;

    /// Create a vertex buffer from raw bytes
    fn create_vertex_buffer(&mut self, data: &[u8]) -> DeviceResult<BufferHandle>;

    /// Create an index buffer from raw bytes
    fn create_index_buffer(&mut self, data: &[u8]) -> DeviceResult<BufferHandle>;

    /// Bind a vertex buffer for subsequent draws
    fn bind_vertex_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<()>;

    /// Bind an index buffer for subsequent draws
    fn bind_index_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<()>;

    /// Issue one indexed draw call over the bound buffers
    fn draw_indexed(&mut self, index_count: u32) -> DeviceResult<()>;

    /// Clear the color and depth targets
    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32);

    /// Resize the viewport
    fn set_viewport(&mut self, width: u32, height: u32);
}
