use crate::sw_error::SwError;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Options applied while importing a scene. Usually constructed in code but
/// can also be read from a small YAML file placed next to the model.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct ImportOptions {
    /// Uniform scale applied to vertex positions and all translations
    pub scale: f32,
    /// Replace v with 1 - v in texture coordinates
    pub flip_uvs: bool,
    /// Calculate vertex normals for meshes that have none
    pub generate_normals: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            scale: 1.0f32,
            flip_uvs: false,
            generate_normals: true,
        }
    }
}

impl ImportOptions {
    /// Reads options from a YAML file. Fields that are not present keep
    /// their default values.
    ///
    /// # Errors
    /// May return `SwError`
    pub fn from_yaml_file(path: &Path) -> Result<Self, SwError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// # Errors
    /// May return `SwError`
    pub fn from_yaml_str(text: &str) -> Result<Self, SwError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Errors specific to the structure of imported data. `SwError` has a
/// `From` trait to handle these.
#[derive(Debug)]
pub enum ImportError {
    NoScene,
    NoRootNode,
    InvalidNode(usize),
    NodeCycle(usize),
    InvalidMesh(usize),
    NoPositions,
    NoIndices,
    NoTriangles,
    CountMismatch,
    SingularRootTransform,
    EmptyTrack { clip: String, channel: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NoScene => write!(f, "file does not contain a scene"),
            Self::NoRootNode => write!(f, "scene has no root node"),
            Self::InvalidNode(a) => write!(f, "node {a} does not exist"),
            Self::NodeCycle(a) => {
                write!(f, "node {a} is reachable more than once")
            }
            Self::InvalidMesh(a) => write!(f, "mesh {a} does not exist"),
            Self::NoPositions => write!(f, "vertex positions are required"),
            Self::NoIndices => {
                write!(f, "only indexed meshes are supported")
            }
            Self::NoTriangles => {
                write!(f, "only triangulated meshes are supported")
            }
            Self::CountMismatch => {
                write!(f, "there is a mismatch in the count of vertices")
            }
            Self::SingularRootTransform => {
                write!(f, "root node transform can not be inverted")
            }
            Self::EmptyTrack { clip, channel } => {
                write!(f, "animation {clip} channel {channel} has no keys")
            }
        }
    }
}
