use crate::{
    mesh::{builder, Mesh},
    scene::{self, Scene},
    scene_import::{self, ImportError, ImportOptions},
    skeleton::{self, BoneRegistry},
    sw_error::SwError,
    texture::{TextureHandle, TextureManager},
    types::{ShaderTrait, ANIMATED_UNIFORM, BONES_UNIFORM, MAX_BONES},
};
use image::RgbaImage;
use log::{info, warn};
use nalgebra_glm as glm;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// A loaded, skinned and possibly animated model. The imported scene is kept
/// for the lifetime of the model because animation evaluation walks its
/// node hierarchy every frame.
pub struct Model {
    scene: Scene,
    meshes: Vec<Mesh>,
    registry: BoneRegistry,
    textures: TextureManager,
    directory: PathBuf,
    global_inverse: glm::Mat4,
    current_animation: usize,
}

impl Model {
    /// Imports a model file. Textures are looked up relative to the
    /// directory containing the file.
    ///
    /// # Errors
    /// May return `SwError`
    pub fn load(path: &Path, options: &ImportOptions) -> Result<Self, SwError> {
        let scene = scene_import::load(path, options)?;
        let directory =
            path.parent().map(Path::to_path_buf).unwrap_or_default();
        let model = Self::from_scene(scene, &directory)?;
        info!(
            "Model {} loaded: {} meshes, {} bones, {} animations",
            path.display(),
            model.meshes.len(),
            model.bone_count(),
            model.num_animations()
        );
        Ok(model)
    }

    /// Builds a model from an already imported scene
    ///
    /// # Errors
    /// May return `SwError` if the scene is malformed or its root transform
    /// can not be inverted
    pub fn from_scene(scene: Scene, directory: &Path) -> Result<Self, SwError> {
        scene::validate(&scene)?;
        let root = scene.root_node().ok_or(ImportError::NoRootNode)?;
        let global_inverse = root
            .transform
            .try_inverse()
            .ok_or(ImportError::SingularRootTransform)?;

        let mut registry = BoneRegistry::new();
        let textures = TextureManager::new();
        let meshes = scene
            .meshes_in_traversal_order()
            .into_iter()
            .map(|i| {
                builder::build(
                    &scene.meshes[i],
                    &scene.materials,
                    &mut registry,
                    &textures,
                    directory,
                )
            })
            .collect();

        Ok(Self {
            scene,
            meshes,
            registry,
            textures,
            directory: directory.to_path_buf(),
            global_inverse,
            current_animation: 0,
        })
    }

    /// Draws every mesh in scene traversal order
    pub fn draw(&self, shader: &mut impl ShaderTrait) {
        for mesh in &self.meshes {
            mesh.draw(shader);
        }
    }

    /// Selects the clip used by `bone_transforms`. An index past the last
    /// clip is ignored.
    pub fn set_animation(&mut self, index: usize) {
        if index < self.num_animations() {
            self.current_animation = index;
        } else {
            warn!(
                "Animation {} requested but model has {}",
                index,
                self.num_animations()
            );
        }
    }

    /// Selects the following clip, going back to the first after the last
    pub fn next_animation(&mut self) {
        if self.has_animations() {
            self.current_animation =
                (self.current_animation + 1) % self.num_animations();
        }
    }

    /// Poses the skeleton with the current clip. A model without animations
    /// returns the bind pose of every bone.
    pub fn bone_transforms(&mut self, time_in_seconds: f32) -> Vec<glm::Mat4> {
        let Some(clip) = self.scene.animations.get(self.current_animation)
        else {
            return self.registry.final_transforms();
        };
        skeleton::evaluate(
            &self.scene,
            clip,
            &mut self.registry,
            &self.global_inverse,
            time_in_seconds,
        )
    }

    /// Uploads the bone matrices for the current clip and switches the
    /// shader to the skinned path, or switches it off if the model is not
    /// animated.
    pub fn set_bone_transformations(
        &mut self,
        shader: &mut impl ShaderTrait,
        time_in_seconds: f32,
    ) {
        if !self.has_animations() {
            shader.set_bool(ANIMATED_UNIFORM, false);
            return;
        }
        let mut transforms = self.bone_transforms(time_in_seconds);
        if transforms.len() > MAX_BONES {
            warn!(
                "Model has {} bones, only {} are uploaded",
                transforms.len(),
                MAX_BONES
            );
            transforms.truncate(MAX_BONES);
        }
        shader.set_mat4_array(BONES_UNIFORM, &transforms);
        shader.set_bool(ANIMATED_UNIFORM, true);
    }

    #[must_use]
    pub fn has_animations(&self) -> bool {
        !self.scene.animations.is_empty()
    }

    #[must_use]
    pub fn num_animations(&self) -> usize {
        self.scene.animations.len()
    }

    #[must_use]
    pub const fn current_animation(&self) -> usize {
        self.current_animation
    }

    #[must_use]
    pub fn animation_name(&self, index: usize) -> Option<&str> {
        self.scene.animations.get(index).map(|a| a.name.as_str())
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.registry.index_of(name)
    }

    #[must_use]
    pub const fn global_inverse(&self) -> &glm::Mat4 {
        &self.global_inverse
    }

    #[must_use]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Decoded image for a texture handle found in one of the meshes
    #[must_use]
    pub fn texture_image(
        &self,
        handle: TextureHandle,
    ) -> Option<Arc<RgbaImage>> {
        self.textures.image(handle)
    }
}
