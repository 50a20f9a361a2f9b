//! Tests for posing a model's skeleton and handing the result to a shader.
//!
//! The scenes are built by hand so the expected matrices can be worked out
//! on paper. The root node carries a translation so that the global inverse
//! is not just an identity matrix.
//!
//! Bone "arm" sits one unit above the root. Its offset is the inverse of
//! that, so in the bind pose its final transformation is identity.

use image::{Rgba, RgbaImage};
use log::info;
use nalgebra_glm as glm;
use sinew::{
    mesh::Mesh,
    model::Model,
    scene::{
        AnimationClip, Key, MaterialTexture, Node, NodeChannel, Scene,
        SceneBone, SceneMaterial, SceneMesh, TextureKind, VertexWeight,
    },
    texture::Texture,
    types::{ShaderTrait, BONES_UNIFORM, MAX_BONES},
};
use smallvec::smallvec;
use std::{
    path::{Path, PathBuf},
    sync::Once,
};

const EPSILON: f32 = 0.0001f32; // Small value for float comparisons
static INIT: Once = Once::new();

/// Initializes logging in a "once per test run" manner. Call at the start of
/// each test that needs logging.
fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

fn mat_eq(a: &glm::Mat4, b: &glm::Mat4) {
    assert!(
        glm::equal_columns_eps(a, b, EPSILON).iter().all(|x| *x),
        "{a} != {b}"
    );
}

/// Shader that writes down everything it is asked to do
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    bones: Vec<glm::Mat4>,
}

impl ShaderTrait for Recorder {
    fn set_int(&mut self, name: &str, value: i32) {
        self.calls.push(format!("int {name}={value}"));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.calls.push(format!("bool {name}={value}"));
    }

    fn set_mat4_array(&mut self, name: &str, matrices: &[glm::Mat4]) {
        self.calls.push(format!("mat4 {name}[{}]", matrices.len()));
        self.bones = matrices.to_vec();
    }

    fn bind_texture(&mut self, unit: u32, texture: &Texture) {
        self.calls.push(format!("bind {unit} {}", texture.path));
    }

    fn draw_indexed(&mut self, mesh: &Mesh) {
        self.calls
            .push(format!("draw {} {}", mesh.name, mesh.indices.len()));
    }
}

fn root_transform() -> glm::Mat4 {
    glm::translation(&glm::vec3(2.0, 0.0, 0.0))
}

fn arm_transform() -> glm::Mat4 {
    glm::translation(&glm::vec3(0.0, 1.0, 0.0))
}

fn triangle(name: &str, bones: Vec<SceneBone>) -> SceneMesh {
    SceneMesh {
        name: name.to_string(),
        positions: vec![
            glm::vec3(0.0, 0.0, 0.0),
            glm::vec3(1.0, 0.0, 0.0),
            glm::vec3(0.0, 1.0, 0.0),
        ],
        faces: vec![smallvec![0, 1, 2]],
        bones,
        ..Default::default()
    }
}

fn bone(name: &str, offset: glm::Mat4) -> SceneBone {
    SceneBone {
        name: name.to_string(),
        offset,
        weights: vec![VertexWeight {
            vertex_id: 2,
            weight: 1.0,
        }],
    }
}

/// Arm moves 4 units along x over 50 ticks, starting from its bind pose. The
/// rate is left unspecified.
fn reach() -> AnimationClip {
    AnimationClip::new(
        "reach",
        0.0,
        vec![NodeChannel {
            node_name: "arm".to_string(),
            positions: vec![
                Key::new(0.0, glm::vec3(0.0, 1.0, 0.0)),
                Key::new(50.0, glm::vec3(4.0, 1.0, 0.0)),
            ],
            rotations: vec![Key::new(0.0, glm::quat(0.0, 0.0, 0.0, 1.0))],
            scales: vec![Key::new(0.0, glm::vec3(1.0, 1.0, 1.0))],
        }],
    )
}

/// Static arm, single keys
fn hold() -> AnimationClip {
    AnimationClip::new(
        "hold",
        30.0,
        vec![NodeChannel {
            node_name: "arm".to_string(),
            positions: vec![Key::new(0.0, glm::vec3(0.0, 1.0, 0.0))],
            rotations: vec![Key::new(0.0, glm::quat(0.0, 0.0, 0.0, 1.0))],
            scales: vec![Key::new(0.0, glm::vec3(1.0, 1.0, 1.0))],
        }],
    )
}

/// Root with an "arm" node and a "leg" node. Mesh "body" on the root uses
/// "arm". Mesh "limbs" on the arm node uses "leg" and "arm" again with a
/// different offset which must be ignored.
fn scene() -> Scene {
    let mut scene = Scene::new("root", root_transform());
    let arm = scene.add_node(0, Node::new("arm", arm_transform()));
    scene.add_node(0, Node::new("leg", glm::Mat4::identity()));
    let arm_offset = glm::inverse(&arm_transform());
    scene.add_mesh(0, triangle("body", vec![bone("arm", arm_offset)]));
    scene.add_mesh(
        arm,
        triangle(
            "limbs",
            vec![
                bone("leg", glm::Mat4::identity()),
                bone("arm", glm::scaling(&glm::vec3(3.0, 3.0, 3.0))),
            ],
        ),
    );
    scene.animations = vec![reach(), hold()];
    scene
}

fn model() -> Model {
    Model::from_scene(scene(), Path::new(".")).unwrap()
}

#[test]
fn shared_bones() {
    init_tests();
    let model = model();
    assert_eq!(model.bone_count(), 2);
    assert_eq!(model.bone_index("arm"), Some(0));
    assert_eq!(model.bone_index("leg"), Some(1));
    assert_eq!(model.bone_index("root"), None);

    let names: Vec<&str> =
        model.meshes().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["body", "limbs"]);
    assert_eq!(model.meshes()[0].vertices[2].bone_ids[0], 0);
    assert_eq!(model.meshes()[1].vertices[2].bone_ids, [1, 0, 0, 0]);
    // Second binding of "arm" lands in the next free slot
    assert_eq!(model.meshes()[1].vertices[2].weights, [1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn bind_pose() {
    init_tests();
    let mut model = model();
    mat_eq(
        &(model.global_inverse() * root_transform()),
        &glm::Mat4::identity(),
    );

    let bones = model.bone_transforms(0.0);
    assert_eq!(bones.len(), 2);
    // First offset wins so the arm is back at identity
    mat_eq(&bones[0], &glm::Mat4::identity());
    // Leg has no channel and keeps its static transform
    mat_eq(&bones[1], &glm::Mat4::identity());
}

#[test]
fn default_rate_and_wrap() {
    init_tests();
    let mut model = model();
    assert_eq!(model.animation_name(0), Some("reach"));

    // 25 ticks per second, so one second is halfway through 50 ticks
    let half = model.bone_transforms(1.0);
    info!("halfway = {}", half[0]);
    mat_eq(&half[0], &glm::translation(&glm::vec3(2.0, 0.0, 0.0)));

    // duration / 25 seconds wraps back to the start
    let wrapped = model.bone_transforms(2.0);
    mat_eq(&wrapped[0], &glm::Mat4::identity());

    // Periodic
    let a = model.bone_transforms(0.3);
    for k in 1..5 {
        #[allow(clippy::cast_precision_loss)]
        let t = 2.0f32.mul_add(k as f32, 0.3);
        let b = model.bone_transforms(t);
        mat_eq(&a[0], &b[0]);
    }
}

#[test]
fn clip_selection() {
    init_tests();
    let mut model = model();
    assert_eq!(model.num_animations(), 2);
    assert_eq!(model.current_animation(), 0);

    model.set_animation(1);
    assert_eq!(model.current_animation(), 1);
    model.set_animation(2); // Ignored
    assert_eq!(model.current_animation(), 1);
    model.set_animation(usize::MAX); // Ignored
    assert_eq!(model.current_animation(), 1);

    model.next_animation();
    assert_eq!(model.current_animation(), 0);
    model.next_animation();
    assert_eq!(model.current_animation(), 1);

    // Single keys are held at any time
    let bones = model.bone_transforms(123.4);
    mat_eq(&bones[0], &glm::Mat4::identity());
}

#[test]
fn bones_uploaded() {
    init_tests();
    let mut model = model();
    let mut shader = Recorder::default();
    model.set_bone_transformations(&mut shader, 1.0);
    assert_eq!(
        shader.calls,
        vec![format!("mat4 {BONES_UNIFORM}[2]"), "bool animated=true".into()]
    );
    assert!(shader.bones.len() <= MAX_BONES);
    mat_eq(&shader.bones[0], &glm::translation(&glm::vec3(2.0, 0.0, 0.0)));

    // Without animations the shader is told to skip skinning
    let mut still = scene();
    still.animations.clear();
    let mut model = Model::from_scene(still, Path::new(".")).unwrap();
    let mut shader = Recorder::default();
    model.set_bone_transformations(&mut shader, 1.0);
    assert_eq!(shader.calls, vec!["bool animated=false".to_string()]);
    assert!(shader.bones.is_empty());
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("sinew-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn draw_names_samplers() {
    init_tests();
    let dir = scratch_dir("draw");
    for name in ["a.png", "b.png", "s.png"] {
        RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 255]))
            .save(dir.join(name))
            .unwrap();
    }

    let mut scene = Scene::new("root", glm::Mat4::identity());
    let mut mesh = triangle("tri", Vec::new());
    mesh.material_index = Some(0);
    scene.add_mesh(0, mesh);
    let texture = |kind, path: &str| MaterialTexture {
        kind,
        path: path.to_string(),
    };
    scene.materials = vec![SceneMaterial {
        name: "skin".to_string(),
        textures: vec![
            texture(TextureKind::Specular, "s.png"),
            texture(TextureKind::Diffuse, "a.png"),
            texture(TextureKind::Normal, "missing.png"),
            texture(TextureKind::Diffuse, "b.png"),
        ],
    }];

    let model = Model::from_scene(scene, &dir).unwrap();
    let mut shader = Recorder::default();
    model.draw(&mut shader);
    assert_eq!(
        shader.calls,
        vec![
            "int texture_diffuse1=0",
            "bind 0 a.png",
            "int texture_diffuse2=1",
            "bind 1 b.png",
            "int texture_specular1=2",
            "bind 2 s.png",
            "draw tri 3",
        ]
    );

    let handle = model.meshes()[0].textures[0].handle;
    let image = model.texture_image(handle).unwrap();
    assert_eq!(image.dimensions(), (1, 1));
    assert_eq!(model.directory(), dir.as_path());

    std::fs::remove_dir_all(&dir).unwrap();
}
