mod types;
mod validate;

// Re-exports
pub use {
    types::{
        AnimationClip, Key, MaterialTexture, Node, NodeChannel, Scene,
        SceneBone, SceneMaterial, SceneMesh, TextureKind, VertexWeight,
    },
    validate::validate,
};
