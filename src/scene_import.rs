pub mod gltf_file;
pub mod obj_file;
mod types;
pub mod util;

use crate::{scene::Scene, sw_error::SwError};
use std::path::Path;

// Re-exports
pub use types::{ImportError, ImportOptions};

/// Imports a scene from a file. Filenames with an ".obj" extension will be
/// loaded as Wavefront OBJ files. Other files will be attempted to be loaded
/// as glTF.
///
/// # Errors
/// May return `SwError`
pub fn load(path: &Path, options: &ImportOptions) -> Result<Scene, SwError> {
    let is_obj = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if is_obj {
        obj_file::load(path, options)
    } else {
        gltf_file::load(path, options)
    }
}
