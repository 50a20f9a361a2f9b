//! Recommend using with
//! `RUSTFLAGS="-C target-cpu=x86-64-v2" cargo bench`
//! and that end users compile their applications in this way. That enables
//! SSE4.2 support which gives a few percent in the matrix heavy code here.
//!
//! The skeleton is a synthetic chain where every node is a bone and every
//! bone is animated, which is about the worst case for a model of a given
//! bone count.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra_glm as glm;
use sinew::{
    scene::{AnimationClip, Key, Node, NodeChannel, Scene},
    skeleton::{self, interpolate, BoneRegistry},
    types::MAX_BONES,
};

const KEYS: usize = 30;

#[allow(clippy::cast_precision_loss)]
fn channel(name: &str) -> NodeChannel {
    let times = (0..KEYS).map(|i| i as f32);
    NodeChannel {
        node_name: name.to_string(),
        positions: times
            .clone()
            .map(|t| Key::new(t, glm::vec3(t.sin(), 1.0, t.cos())))
            .collect(),
        rotations: times
            .clone()
            .map(|t| {
                Key::new(
                    t,
                    glm::quat_angle_axis(t * 0.1, &glm::vec3(0.0, 0.0, 1.0)),
                )
            })
            .collect(),
        scales: times
            .map(|t| Key::new(t, glm::vec3(1.0, 1.0, 1.0)))
            .collect(),
    }
}

fn chain(bones: usize) -> (Scene, AnimationClip, BoneRegistry) {
    let mut scene = Scene::new("root", glm::Mat4::identity());
    let mut registry = BoneRegistry::new();
    let mut channels = Vec::with_capacity(bones);
    let mut parent = scene.root;
    for i in 0..bones {
        let name = format!("bone{i}");
        let index = registry.bind(&name);
        registry.set_offset(
            index,
            glm::translation(&glm::vec3(0.0, -1.0, 0.0)),
        );
        parent = scene.add_node(
            parent,
            Node::new(&name, glm::translation(&glm::vec3(0.0, 1.0, 0.0))),
        );
        channels.push(channel(&name));
    }
    let clip = AnimationClip::new("wave", 30.0, channels);
    (scene, clip, registry)
}

fn evaluate_chain(c: &mut Criterion) {
    let (scene, clip, mut registry) = chain(MAX_BONES);
    let inverse = glm::Mat4::identity();
    c.bench_function(
        "evaluate 100 bones", //
        |b| {
            b.iter(|| {
                skeleton::evaluate(
                    &scene,
                    &clip,
                    &mut registry,
                    &inverse,
                    black_box(0.37),
                )
            });
        },
    );
}

fn local_transform(c: &mut Criterion) {
    let ch = black_box(channel("bone"));
    c.bench_function(
        "local_transform", //
        |b| b.iter(|| interpolate::local_transform(&ch, black_box(17.5))),
    );
}

criterion_group!(benches, evaluate_chain, local_transform);
criterion_main!(benches);
