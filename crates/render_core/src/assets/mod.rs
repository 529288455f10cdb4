//! Asset loading
//!
//! CPU-side decoding of external files. GPU upload happens in the render
//! module through the device.

pub mod image_loader;

pub use image_loader::{ImageData, ImageLoadError};
