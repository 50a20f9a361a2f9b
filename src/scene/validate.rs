use super::types::Scene;
use crate::scene_import::ImportError;
use log::{debug, warn};

/// Checks that a scene can be used by a model. The node tree must be
/// reachable from the root without any node being visited twice, every
/// mesh reference must be valid, and every animation channel must have at
/// least one key in each of its tracks.
///
/// Keys that are not in increasing time order are only warned about.
///
/// # Errors
/// Returns the first `ImportError` found
pub fn validate(scene: &Scene) -> Result<(), ImportError> {
    if scene.root_node().is_none() {
        return Err(ImportError::NoRootNode);
    }

    let mut visited = vec![false; scene.nodes.len()];
    let mut stack = vec![scene.root];
    while let Some(index) = stack.pop() {
        let Some(node) = scene.nodes.get(index) else {
            return Err(ImportError::InvalidNode(index));
        };
        if visited[index] {
            return Err(ImportError::NodeCycle(index));
        }
        visited[index] = true;
        if let Some(&bad) =
            node.meshes.iter().find(|&&m| m >= scene.meshes.len())
        {
            return Err(ImportError::InvalidMesh(bad));
        }
        stack.extend(&node.children);
    }

    for clip in &scene.animations {
        for channel in clip.channels() {
            if channel.has_empty_track() {
                return Err(ImportError::EmptyTrack {
                    clip: clip.name.clone(),
                    channel: channel.node_name.clone(),
                });
            }
            let sorted = channel
                .positions
                .windows(2)
                .all(|w| w[0].time < w[1].time)
                && channel.rotations.windows(2).all(|w| w[0].time < w[1].time)
                && channel.scales.windows(2).all(|w| w[0].time < w[1].time);
            if !sorted {
                warn!(
                    "clip {} channel {} has keys out of order",
                    clip.name, channel.node_name
                );
            }
        }
        debug!(
            "clip {} channels={} duration={} ticks/s={}",
            clip.name,
            clip.channels().len(),
            clip.effective_duration(),
            clip.ticks_per_second()
        );
    }
    Ok(())
}
