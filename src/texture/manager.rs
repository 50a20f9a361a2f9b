use super::import;
use ahash::AHashMap;
use image::RgbaImage;
use log::{error, info};
use parking_lot::Mutex;
use std::{path::Path, sync::Arc};

/// Handle for a loaded texture. Handle 0 is never assigned and stands for a
/// texture that could not be loaded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub const NULL: Self = Self(0);

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Default)]
struct Cache {
    by_name: AHashMap<String, TextureHandle>,
    images: Vec<Arc<RgbaImage>>, // Index is handle - 1
}

/// Texture caching in a multithread friendly way.
/// Textures are keyed by the file name exactly as the material lists it, so
/// a file referenced by several meshes of a model is decoded once.
/// The cache is wrapped in a `parking_lot::Mutex` so a model may be built
/// on a loader thread.
#[derive(Default)]
pub struct Manager {
    cache: Mutex<Cache>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Reserve space to perhaps avoid some realloc/rehash.
            cache: Mutex::new(Cache {
                by_name: AHashMap::with_capacity(16),
                images: Vec::with_capacity(16),
            }),
        }
    }

    /// Loads `filename` relative to `directory`, or returns the cached
    /// handle if the same filename was tried before. A file that can not
    /// be loaded is logged once and `TextureHandle::NULL` is cached for it,
    /// so later requests for that filename return NULL without another
    /// attempt.
    pub fn load(&self, filename: &str, directory: &Path) -> TextureHandle {
        let mut cache = self.cache.lock();

        if let Some(handle) = cache.by_name.get(filename) {
            info!("Texture cache hit: {}", filename);
            return *handle;
        }
        info!("Texture cache miss: {}", filename);
        let path = directory.join(filename);
        match import::load(&path) {
            Ok(image) => {
                cache.images.push(Arc::new(image));
                let Ok(id) = u32::try_from(cache.images.len()) else {
                    cache.images.pop();
                    error!("Too many textures to load {}", path.display());
                    return TextureHandle::NULL;
                };
                let handle = TextureHandle(id);
                cache.by_name.insert(filename.to_string(), handle);
                drop(cache);
                handle
            }
            Err(e) => {
                error!(
                    "Texture failed to load at path: {} ({e})",
                    path.display()
                );
                cache
                    .by_name
                    .insert(filename.to_string(), TextureHandle::NULL);
                drop(cache);
                TextureHandle::NULL
            }
        }
    }

    /// Decoded image for a handle
    #[must_use]
    pub fn image(&self, handle: TextureHandle) -> Option<Arc<RgbaImage>> {
        if handle.is_null() {
            return None;
        }
        let index = usize::try_from(handle.0 - 1).ok()?;
        self.cache.lock().images.get(index).cloned()
    }

    /// Number of textures successfully loaded. Failed filenames are not
    /// counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
