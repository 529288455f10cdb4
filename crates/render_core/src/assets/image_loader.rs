//! Image decoding for texture data
//!
//! Wraps the `image` crate, producing raw pixel buffers ready for GPU
//! upload. RGB sources stay 3-channel, everything else is normalized to
//! RGBA.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image decode failure
#[derive(Debug, Error)]
pub enum ImageLoadError {
    /// The file could not be read or its contents are not a supported image
    #[error("failed to decode image {path:?}: {source}")]
    Decode {
        /// Path of the offending file
        path: PathBuf,
        /// Decoder diagnostic
        #[source]
        source: image::ImageError,
    },
    /// In-memory bytes are not a supported image
    #[error("failed to decode image from memory: {0}")]
    DecodeMemory(#[from] image::ImageError),
}

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw pixel data, tightly packed rows
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (3 for RGB sources, 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Decode an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageLoadError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref).map_err(|e| ImageLoadError::Decode {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

        let decoded = Self::from_dynamic(img);
        log::info!(
            "Loaded image {}x{} ({} channels) from {:?}",
            decoded.width,
            decoded.height,
            decoded.channels,
            path_ref
        );

        Ok(decoded)
    }

    /// Decode an image from in-memory bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageLoadError> {
        let img = image::load_from_memory(bytes)?;
        let decoded = Self::from_dynamic(img);

        log::debug!(
            "Loaded image {}x{} ({} channels) from memory",
            decoded.width,
            decoded.height,
            decoded.channels
        );

        Ok(decoded)
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);

        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    fn from_dynamic(img: image::DynamicImage) -> Self {
        // RGB stays 3-channel so the texture records the source layout;
        // every other color type becomes RGBA.
        match img.color() {
            image::ColorType::Rgb8 => {
                let rgb = img.to_rgb8();
                let (width, height) = rgb.dimensions();
                Self {
                    data: rgb.into_raw(),
                    width,
                    height,
                    channels: 3,
                }
            }
            _ => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                Self {
                    data: rgba.into_raw(),
                    width,
                    height,
                    channels: 4,
                }
            }
        }
    }
}
