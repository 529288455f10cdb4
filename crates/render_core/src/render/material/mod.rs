//! Material-side texture handling

pub mod texture_cache;

pub use texture_cache::{Texture2D, TextureCache, TextureError};
