//! Device implementations behind the [`RenderDevice`](crate::render::api::RenderDevice) trait

pub mod headless;

pub use headless::{DeviceStats, HeadlessDevice, UniformWrite};
