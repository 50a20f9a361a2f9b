use ahash::{HashMap, HashMapExt};
use log::trace;
use nalgebra_glm as glm;

#[derive(Clone, Copy, Debug)]
struct BoneMatrix {
    offset: glm::Mat4,
    final_transformation: glm::Mat4,
}

/// Bones of a model, indexed in the order they were first bound. The index
/// of a bone never changes and bones are never removed.
#[derive(Clone, Debug, Default)]
pub struct BoneRegistry {
    mapping: HashMap<String, usize>,
    bones: Vec<BoneMatrix>,
}

impl BoneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mapping: HashMap::new(),
            bones: Vec::new(),
        }
    }

    /// Returns the index of the named bone, allocating the next index if
    /// the name has not been seen before. A new bone has an identity offset
    /// and final transformation until they are set.
    pub fn bind(&mut self, name: &str) -> usize {
        if let Some(&index) = self.mapping.get(name) {
            return index;
        }
        let index = self.bones.len();
        self.bones.push(BoneMatrix {
            offset: glm::Mat4::identity(),
            final_transformation: glm::Mat4::identity(),
        });
        self.mapping.insert(name.to_string(), index);
        trace!("bone {} bound to index {}", name, index);
        index
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.mapping.contains_key(name)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.mapping.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Sets the matrix taking mesh space into bone space in the bind pose.
    /// Out of range indices are ignored.
    pub fn set_offset(&mut self, index: usize, offset: glm::Mat4) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.offset = offset;
        }
    }

    #[must_use]
    pub fn offset(&self, index: usize) -> Option<&glm::Mat4> {
        self.bones.get(index).map(|b| &b.offset)
    }

    /// Sets the current pose of a bone. Out of range indices are ignored.
    pub fn set_final(&mut self, index: usize, transformation: glm::Mat4) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.final_transformation = transformation;
        }
    }

    /// Current pose of every bone, in index order
    #[must_use]
    pub fn final_transforms(&self) -> Vec<glm::Mat4> {
        self.bones.iter().map(|b| b.final_transformation).collect()
    }
}
