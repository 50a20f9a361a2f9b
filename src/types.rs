use crate::{mesh::Mesh, texture::Texture};
use nalgebra_glm as glm;

/// Maximum bones uploaded to the shader. You can't actually change this
/// constant without also changing the size of the `gBones` array in the
/// vertex shader.
pub const MAX_BONES: usize = 100;

/// Maximum number of bones that may influence a single vertex. This matches
/// the `ivec4`/`vec4` pair of vertex attributes used by the shader.
pub const MAX_BONES_PER_VERTEX: usize = 4;

/// Ticks per second used when an animation clip does not specify a rate
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Name of the uniform array that receives the bone matrices
pub const BONES_UNIFORM: &str = "gBones";

/// Name of the uniform that selects the skinned vertex path
pub const ANIMATED_UNIFORM: &str = "animated";

/// Trait for the shader program that draws a model. The application owns
/// the GPU side of things (buffers, pipelines, texture objects) and
/// implements this to receive uniforms and draw requests.
pub trait ShaderTrait {
    fn set_int(&mut self, name: &str, value: i32);
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_mat4_array(&mut self, name: &str, matrices: &[glm::Mat4]);

    /// Binds a texture to a texture unit. The sampler uniform for that unit
    /// has already been set with `set_int`.
    fn bind_texture(&mut self, unit: u32, texture: &Texture);

    /// Issues an indexed triangle list draw for the mesh
    fn draw_indexed(&mut self, mesh: &Mesh);
}
