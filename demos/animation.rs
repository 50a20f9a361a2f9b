//! Headless demo of animation using sinew
//!
//! Loads a model, then steps through a few seconds of each of its clips at
//! a fixed rate with a shader that only logs what it is asked to do. Run
//! with `RUST_LOG=info` (or `debug`) to see the output.
//!
//! Usage: `cargo run --example animation -- <model file> [options.yaml]`
use log::{debug, error, info};
use nalgebra_glm as glm;
use sinew::{
    mesh::Mesh,
    model::Model,
    scene_import::ImportOptions,
    texture::Texture,
    types::ShaderTrait,
};
use std::path::Path;

const FILENAME: &str = "./demos/assets/model.gltf";
const SIM_RATE: f32 = 1.0 / 30.0;
const SECONDS_PER_CLIP: f32 = 2.0;

/// Shader that logs calls instead of talking to a GPU
#[derive(Default)]
struct LogShader {
    draws: usize,
    triangles: usize,
}

impl ShaderTrait for LogShader {
    fn set_int(&mut self, name: &str, value: i32) {
        debug!("set_int {name} = {value}");
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        debug!("set_bool {name} = {value}");
    }

    fn set_mat4_array(&mut self, name: &str, matrices: &[glm::Mat4]) {
        debug!("set_mat4_array {name} [{}]", matrices.len());
        if let Some(first) = matrices.first() {
            debug!("{name}[0] = {first}");
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: &Texture) {
        debug!("bind_texture {unit} {:?} {}", texture.kind, texture.path);
    }

    fn draw_indexed(&mut self, mesh: &Mesh) {
        self.draws += 1;
        self.triangles += mesh.indices.len() / 3;
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let file_path = if args.len() < 2 {
        FILENAME.to_string()
    } else {
        args[1].clone()
    };
    let options = match args.get(2) {
        Some(yaml) => match ImportOptions::from_yaml_file(Path::new(yaml)) {
            Ok(o) => o,
            Err(e) => {
                error!("Could not read options {yaml}: {e}");
                return;
            }
        },
        None => ImportOptions::default(),
    };

    let mut model = match Model::load(Path::new(&file_path), &options) {
        Ok(m) => m,
        Err(e) => {
            error!("Could not load {file_path}: {e}");
            return;
        }
    };

    let mut shader = LogShader::default();
    let clips = model.num_animations().max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (SECONDS_PER_CLIP / SIM_RATE) as usize;
    for _ in 0..clips {
        info!(
            "Playing clip {} {:?}",
            model.current_animation(),
            model.animation_name(model.current_animation())
        );
        for frame in 0..frames {
            #[allow(clippy::cast_precision_loss)]
            let time = frame as f32 * SIM_RATE;
            model.set_bone_transformations(&mut shader, time);
            model.draw(&mut shader);
        }
        model.next_animation();
    }
    info!(
        "{} draws, {} triangles, {} bones",
        shader.draws,
        shader.triangles,
        model.bone_count()
    );
}
