pub mod import;
mod manager;

// Re-exports
pub use crate::scene::TextureKind;
pub use manager::TextureHandle;
#[allow(clippy::module_name_repetitions)]
pub use manager::Manager as TextureManager;

/// A texture used by a mesh. The same handle may appear in several meshes,
/// possibly with different kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub kind: TextureKind,
    pub path: String,
}
