pub mod builder;
mod vertex;

use crate::{
    texture::{Texture, TextureKind},
    types::ShaderTrait,
};
use smallvec::SmallVec;

// Re-exports
pub use vertex::Vertex;

/// Renderable mesh: skinned vertices, triangle indices and the textures
/// gathered from its material.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub textures: SmallVec<[Texture; 4]>,
}

impl Mesh {
    /// Binds each texture to the next texture unit, tells the shader which
    /// unit its sampler uses, then issues the indexed draw.
    ///
    /// Sampler names are the kind prefix followed by a count starting at 1
    /// for each kind, for example `texture_diffuse1`, `texture_diffuse2`,
    /// `texture_specular1`.
    pub fn draw(&self, shader: &mut impl ShaderTrait) {
        let mut counters = [1u32; TextureKind::ALL.len()];
        for (unit, texture) in (0u32..).zip(&self.textures) {
            let counter = &mut counters[texture.kind.slot()];
            let name = format!("{}{}", texture.kind.uniform_prefix(), counter);
            *counter += 1;
            #[allow(clippy::cast_possible_wrap)]
            shader.set_int(&name, unit as i32);
            shader.bind_texture(unit, texture);
        }
        shader.draw_indexed(self);
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}
