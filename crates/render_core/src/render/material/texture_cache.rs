//! Texture cache for deduplicating GPU uploads
//!
//! Provides a caching layer over image decoding and device upload so
//! that a texture referenced from several meshes reaches the GPU
//! exactly once. Entries are keyed by lexically normalized path, which
//! folds `./` and `dir/../` spellings of the same file onto one entry.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::assets::{ImageData, ImageLoadError};
use crate::render::api::{
    DeviceError, RenderDevice, TextureDescriptor, TextureFormat, TextureHandle, TextureParams,
};

/// Errors from loading a texture into the cache
#[derive(Debug, Error)]
pub enum TextureError {
    /// The source image could not be read or decoded
    #[error("failed to decode texture image")]
    Image(#[from] ImageLoadError),

    /// The device rejected the upload
    #[error("render device rejected texture upload")]
    Device(#[from] DeviceError),
}

/// Uploaded texture together with its source metadata
#[derive(Debug)]
pub struct Texture2D {
    handle: TextureHandle,
    path: PathBuf,
    width: u32,
    height: u32,
    channels: u8,
}

impl Texture2D {
    /// Device handle for binding
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Normalized source path this texture was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color channels in the uploaded data (3 or 4)
    pub fn channels(&self) -> u8 {
        self.channels
    }
}

/// Cache storage: normalized path -> shared texture
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<PathBuf, Arc<Texture2D>>,
}

impl TextureCache {
    /// Create a new empty texture cache
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Load a texture from file, using the cache if available
    ///
    /// A cache hit returns a clone of the shared handle without
    /// touching the filesystem or the device. A miss decodes the
    /// image, uploads it once, and caches the result; on failure
    /// nothing is inserted, so a later retry starts clean.
    ///
    /// # Arguments
    /// * `device` - Device that receives the pixel upload
    /// * `path` - Image file path, normalized into the cache key
    /// * `params` - Sampling parameters for a fresh upload
    ///
    /// # Returns
    /// A shared reference to the cached texture
    pub fn load(
        &mut self,
        device: &mut dyn RenderDevice,
        path: impl AsRef<Path>,
        params: TextureParams,
    ) -> Result<Arc<Texture2D>, TextureError> {
        let path = path.as_ref();
        let key = normalize_path(path);

        if let Some(entry) = self.entries.get(&key) {
            log::trace!("Texture cache hit for {:?}", key);
            return Ok(Arc::clone(entry));
        }

        let image = ImageData::from_file(path)?;
        let format = match image.channels {
            3 => TextureFormat::Rgb8,
            _ => TextureFormat::Rgba8,
        };
        let descriptor = TextureDescriptor {
            width: image.width,
            height: image.height,
            format,
            params,
        };
        let handle = device.create_texture(&descriptor, &image.data)?;

        let texture = Arc::new(Texture2D {
            handle,
            path: key.clone(),
            width: image.width,
            height: image.height,
            channels: image.channels,
        });
        self.entries.insert(key, Arc::clone(&texture));

        log::debug!(
            "Uploaded texture {:?} ({}x{}, {} channels) as {:?}",
            texture.path,
            texture.width,
            texture.height,
            texture.channels,
            texture.handle
        );
        Ok(texture)
    }

    /// Get a cached texture without loading
    pub fn get_cached(&self, path: impl AsRef<Path>) -> Option<Arc<Texture2D>> {
        self.entries
            .get(&normalize_path(path.as_ref()))
            .map(Arc::clone)
    }

    /// Check if a texture is cached
    pub fn is_cached(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(&normalize_path(path.as_ref()))
    }

    /// Drop all cache entries
    ///
    /// Textures still referenced elsewhere stay alive through their
    /// `Arc`; the next load of any path uploads again.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached textures
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lexically fold `.` and `..` components out of a path
///
/// Works without filesystem access, so it also normalizes paths that
/// do not exist yet. A leading run of `..` components is preserved.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessDevice;

    fn write_test_png(path: &Path) {
        image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_second_load_reuses_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diffuse.png");
        write_test_png(&path);

        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new();

        let first = cache.load(&mut device, &path, TextureParams::default()).unwrap();
        let second = cache.load(&mut device, &path, TextureParams::default()).unwrap();

        assert_eq!(device.stats().texture_uploads, 1);
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.handle(), second.handle());
    }

    #[test]
    fn test_path_spellings_share_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diffuse.png");
        write_test_png(&path);

        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new();

        let plain = cache.load(&mut device, &path, TextureParams::default()).unwrap();
        let dotted = dir.path().join(".").join("diffuse.png");
        let via_parent = dir.path().join("sub").join("..").join("diffuse.png");

        let hit_a = cache.load(&mut device, &dotted, TextureParams::default()).unwrap();
        let hit_b = cache.load(&mut device, &via_parent, TextureParams::default()).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(device.stats().texture_uploads, 1);
        assert!(Arc::ptr_eq(&plain, &hit_a));
        assert!(Arc::ptr_eq(&plain, &hit_b));
    }

    #[test]
    fn test_failed_load_leaves_no_entry() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("broken.png");
        std::fs::write(&garbage, b"definitely not a png").unwrap();

        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new();

        match cache.load(&mut device, &garbage, TextureParams::default()) {
            Err(TextureError::Image(_)) => {}
            other => panic!("Expected image error, got {:?}", other.map(|t| t.path().to_path_buf())),
        }

        assert!(cache.is_empty());
        assert_eq!(device.stats().texture_uploads, 0);
    }

    #[test]
    fn test_clear_allows_re_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diffuse.png");
        write_test_png(&path);

        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new();

        cache.load(&mut device, &path, TextureParams::default()).unwrap();
        assert!(cache.is_cached(&path));

        cache.clear();
        assert!(!cache.is_cached(&path));

        cache.load(&mut device, &path, TextureParams::default()).unwrap();
        assert_eq!(device.stats().texture_uploads, 2);
    }

    #[test]
    fn test_normalize_path_folds_components() {
        assert_eq!(
            normalize_path(Path::new("assets/./textures/../diffuse.png")),
            PathBuf::from("assets/diffuse.png")
        );
        assert_eq!(
            normalize_path(Path::new("../shared/tex.png")),
            PathBuf::from("../shared/tex.png")
        );
    }
}
