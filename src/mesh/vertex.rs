use crate::types::MAX_BONES_PER_VERTEX;
use bytemuck::{Pod, Zeroable};

/// Vertex format for skinned meshes. The layout is `#[repr(C)]` so a slice
/// of these can be uploaded to a vertex buffer directly with
/// `bytemuck::cast_slice`.
///
/// Attribute locations expected by the shader:
/// 0 = position, 1 = normal, 2 = `tex_coord`, 3 = `bone_ids` (ivec4),
/// 4 = weights (vec4)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub bone_ids: [i32; MAX_BONES_PER_VERTEX],
    pub weights: [f32; MAX_BONES_PER_VERTEX],
}

impl Vertex {
    /// Stores a bone influence in the first free slot. A slot is free when
    /// its weight is 0. Returns `false` if all slots are taken, in which
    /// case the influence is dropped.
    #[allow(clippy::float_cmp)]
    pub fn add_bone(&mut self, bone_id: i32, weight: f32) -> bool {
        for (id, w) in self.bone_ids.iter_mut().zip(&mut self.weights) {
            if *w == 0.0 {
                *id = bone_id;
                *w = weight;
                return true;
            }
        }
        false
    }

    /// Number of slots holding a nonzero weight
    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn influence_count(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::Vertex;

    #[test]
    fn at_most_four_influences() {
        let mut v = Vertex::default();
        assert!(v.add_bone(3, 0.4));
        assert!(v.add_bone(1, 0.3));
        assert!(v.add_bone(7, 0.2));
        assert!(v.add_bone(2, 0.1));
        assert!(!v.add_bone(5, 0.9)); // Dropped
        assert_eq!(v.bone_ids, [3, 1, 7, 2]);
        assert_eq!(v.weights, [0.4, 0.3, 0.2, 0.1]);
        assert_eq!(v.influence_count(), 4);
    }

    #[test]
    fn layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 64);
        let verts = [Vertex::default(); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 128);
    }
}
