//! Skeletal animation for skinned meshes.
//!
//! A `model::Model` is imported from glTF or OBJ, its meshes are converted
//! into vertices carrying up to four bone influences each, and every frame
//! the skeleton is posed for the current animation clip. The resulting bone
//! matrices are handed to the application's shader through
//! `types::ShaderTrait`, which keeps all GPU work outside this crate.

pub mod mesh;
pub mod model;
pub mod scene;
pub mod scene_import;
pub mod skeleton;
pub mod sw_error;
pub mod texture;
pub mod types;
