use crate::types::DEFAULT_TICKS_PER_SECOND;
use ahash::{HashMap, HashMapExt};
use nalgebra_glm as glm;
use smallvec::SmallVec;

/// A node in the scene hierarchy. Nodes live in the `Scene::nodes` arena and
/// refer to their children and meshes by index.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: glm::Mat4,
    pub children: Vec<usize>,
    pub meshes: Vec<usize>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str, transform: glm::Mat4) -> Self {
        Self {
            name: name.to_string(),
            transform,
            children: Vec::new(),
            meshes: Vec::new(),
        }
    }
}

/// Influence of a bone on one vertex of a mesh
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// Skinning record for a mesh: a named bone, the matrix taking mesh space
/// into the bone's space in the bind pose, and the vertices it moves.
#[derive(Clone, Debug)]
pub struct SceneBone {
    pub name: String,
    pub offset: glm::Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Mesh data as it comes out of an importer. `normals` and `tex_coords` may
/// be empty.
#[derive(Clone, Debug, Default)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<glm::Vec3>,
    pub normals: Vec<glm::Vec3>,
    pub tex_coords: Vec<[f32; 2]>,
    pub faces: Vec<SmallVec<[u32; 3]>>,
    pub material_index: Option<usize>,
    pub bones: Vec<SceneBone>,
}

/// Semantic slot of a material texture
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Emission,
}

impl TextureKind {
    /// All kinds, in the order textures are gathered for a mesh
    pub const ALL: [Self; 4] =
        [Self::Diffuse, Self::Specular, Self::Normal, Self::Emission];

    /// Prefix of the sampler uniform. The shader expects names like
    /// `texture_diffuse1`, `texture_diffuse2`, `texture_specular1`...
    #[must_use]
    pub const fn uniform_prefix(self) -> &'static str {
        match self {
            Self::Diffuse => "texture_diffuse",
            Self::Specular => "texture_specular",
            Self::Normal => "texture_normal",
            Self::Emission => "texture_emission",
        }
    }

    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Diffuse => 0,
            Self::Specular => 1,
            Self::Normal => 2,
            Self::Emission => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialTexture {
    pub kind: TextureKind,
    pub path: String, // Relative to the model directory
}

#[derive(Clone, Debug, Default)]
pub struct SceneMaterial {
    pub name: String,
    pub textures: Vec<MaterialTexture>,
}

impl SceneMaterial {
    /// Texture paths of one kind in the order they were listed
    pub fn textures_of(
        &self,
        kind: TextureKind,
    ) -> impl Iterator<Item = &str> + '_ {
        self.textures
            .iter()
            .filter(move |t| t.kind == kind)
            .map(|t| t.path.as_str())
    }
}

/// A keyframe. Time is in ticks of the owning clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Key<T> {
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Animation of a single node. The three tracks are timed independently and
/// may have different lengths, but none of them may be empty.
#[derive(Clone, Debug)]
pub struct NodeChannel {
    pub node_name: String,
    pub positions: Vec<Key<glm::Vec3>>,
    pub rotations: Vec<Key<glm::Quat>>,
    pub scales: Vec<Key<glm::Vec3>>,
}

impl NodeChannel {
    #[must_use]
    pub const fn has_empty_track(&self) -> bool {
        self.positions.is_empty()
            || self.rotations.is_empty()
            || self.scales.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    ticks_per_second: f32,
    channels: Vec<NodeChannel>,
    lookup: HashMap<String, usize>,
}

impl AnimationClip {
    /// Creates a clip. A `ticks_per_second` of 0 means the rate was not
    /// specified. If more than one channel names the same node the first one
    /// is used.
    #[must_use]
    pub fn new(
        name: &str,
        ticks_per_second: f32,
        channels: Vec<NodeChannel>,
    ) -> Self {
        let mut lookup = HashMap::with_capacity(channels.len());
        for (i, channel) in channels.iter().enumerate() {
            lookup.entry(channel.node_name.clone()).or_insert(i);
        }
        Self {
            name: name.to_string(),
            ticks_per_second,
            channels,
            lookup,
        }
    }

    /// Rate as stored in the source file, possibly 0
    #[must_use]
    pub const fn raw_ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Rate used for playback. Only a rate of exactly 0 is replaced by the
    /// default, a negative rate plays the clip backwards.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn ticks_per_second(&self) -> f32 {
        if self.ticks_per_second != 0.0 {
            self.ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        }
    }

    /// Length of the clip in ticks. This is the time of the last position
    /// key of the first channel only. Other channels running longer are cut
    /// off when playback wraps.
    #[must_use]
    pub fn effective_duration(&self) -> f32 {
        self.channels
            .first()
            .and_then(|c| c.positions.last())
            .map_or(0.0, |k| k.time)
    }

    #[must_use]
    pub fn channels(&self) -> &[NodeChannel] {
        &self.channels
    }

    #[must_use]
    pub fn channel(&self, node_name: &str) -> Option<&NodeChannel> {
        self.lookup.get(node_name).map(|&i| &self.channels[i])
    }
}

/// Imported scene. Owned by the model once loaded and never modified.
#[derive(Clone, Debug)]
pub struct Scene {
    pub nodes: Vec<Node>,
    pub root: usize,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    pub animations: Vec<AnimationClip>,
}

impl Scene {
    /// Creates a scene containing only a root node with the given transform
    #[must_use]
    pub fn new(root_name: &str, root_transform: glm::Mat4) -> Self {
        Self {
            nodes: vec![Node::new(root_name, root_transform)],
            root: 0,
            meshes: Vec::new(),
            materials: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Adds a node as a child of `parent` and returns its index.
    ///
    /// # Panics
    /// Will panic if `parent` is not a valid node index
    pub fn add_node(&mut self, parent: usize, node: Node) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(index);
        index
    }

    /// Adds a mesh, attaches it to `node` and returns its index.
    ///
    /// # Panics
    /// Will panic if `node` is not a valid node index
    pub fn add_mesh(&mut self, node: usize, mesh: SceneMesh) -> usize {
        let index = self.meshes.len();
        self.meshes.push(mesh);
        self.nodes[node].meshes.push(index);
        index
    }

    #[must_use]
    pub fn root_node(&self) -> Option<&Node> {
        self.nodes.get(self.root)
    }

    /// Mesh indices in scene traversal order: depth first from the root,
    /// a node's own meshes before those of its children.
    #[must_use]
    pub fn meshes_in_traversal_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.meshes.len());
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            out.extend_from_slice(&node.meshes);
            // Reversed so the first child is visited first
            stack.extend(node.children.iter().rev());
        }
        out
    }
}
