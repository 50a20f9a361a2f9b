use super::{interpolate, BoneRegistry};
use crate::scene::{AnimationClip, Scene};
use log::debug;
use nalgebra_glm as glm;

/// Converts a wall clock time into clip ticks, wrapped into the range
/// `[0, duration)` of the clip. A clip without a positive duration always
/// returns 0.
#[must_use]
pub fn animation_time(clip: &AnimationClip, time_in_seconds: f32) -> f32 {
    let ticks = time_in_seconds * clip.ticks_per_second();
    let duration = clip.effective_duration();
    if duration > 0.0 {
        let wrapped = ticks.rem_euclid(duration);
        // `rem_euclid` can round up to exactly `duration` for tiny negative
        // inputs
        if wrapped < duration {
            wrapped
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// Walks the node hierarchy from `node_index`, writing the final
/// transformation of every bone it finds into the registry
fn traverse(
    scene: &Scene,
    clip: &AnimationClip,
    registry: &mut BoneRegistry,
    global_inverse: &glm::Mat4,
    node_index: usize,
    parent_transform: glm::Mat4,
    time: f32,
) {
    let Some(node) = scene.nodes.get(node_index) else {
        debug!("node_index={} not in scene", node_index);
        return;
    };

    // Animated nodes replace their static transform entirely
    let local = clip
        .channel(&node.name)
        .and_then(|channel| interpolate::local_transform(channel, time))
        .unwrap_or(node.transform);
    let global = parent_transform * local;

    if let Some(bone_index) = registry.index_of(&node.name) {
        if let Some(offset) = registry.offset(bone_index).copied() {
            registry.set_final(bone_index, global_inverse * global * offset);
        }
    }

    for &child_index in &node.children {
        traverse(
            scene,
            clip,
            registry,
            global_inverse,
            child_index,
            global,
            time,
        );
    }
}

/// Poses the skeleton for the clip at an arbitrary time in seconds. Every
/// bone reached from the scene root gets a new final transformation and the
/// full set is returned in bone index order.
pub fn evaluate(
    scene: &Scene,
    clip: &AnimationClip,
    registry: &mut BoneRegistry,
    global_inverse: &glm::Mat4,
    time_in_seconds: f32,
) -> Vec<glm::Mat4> {
    let time = animation_time(clip, time_in_seconds);
    traverse(
        scene,
        clip,
        registry,
        global_inverse,
        scene.root,
        glm::Mat4::identity(),
        time,
    );
    registry.final_transforms()
}
