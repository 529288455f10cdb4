//! Device-facing API types and traits

pub mod device;

pub use device::{
    BufferHandle, DeviceError, DeviceResult, FilterMode, ProgramHandle, RenderDevice,
    ShaderStage, ShaderStageHandle, TextureDescriptor, TextureFormat, TextureHandle,
    TextureParams, UniformLocation, UniformValue, WrapMode,
};
