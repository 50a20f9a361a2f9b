use crate::scene::{Key, NodeChannel};
use nalgebra::UnitQuaternion;
use nalgebra_glm as glm;

/// Helper to calculate the parameter used for interpolation
fn weight(start: f32, end: f32, current: f32) -> f32 {
    const EPSILON: f32 = 0.0005;
    ((current - start) / (end - start).max(EPSILON)).clamp(0.0f32, 1.0f32)
}

/// Index of the key starting the bracket containing `time`: the first `i`
/// for which `time < keys[i + 1].time`. Returns `None` when the time is at
/// or past the last key, or when there are fewer than two keys.
fn find_key<T>(keys: &[Key<T>], time: f32) -> Option<usize> {
    keys.windows(2).position(|w| time < w[1].time)
}

/// Samples a track. A single key is returned verbatim. Times before the
/// first key hold the first value and times past the last key hold the last
/// value. Returns `None` only for an empty track.
fn sample<T, F>(keys: &[Key<T>], time: f32, blend: F) -> Option<T>
where
    T: Copy,
    F: Fn(&T, &T, f32) -> T,
{
    if let [only] = keys {
        return Some(only.value);
    }
    find_key(keys, time).map_or_else(
        || keys.last().map(|k| k.value),
        |i| {
            let (start, end) = (&keys[i], &keys[i + 1]);
            Some(blend(
                &start.value,
                &end.value,
                weight(start.time, end.time, time),
            ))
        },
    )
}

/// Shortest arc spherical interpolation. Falls back to a normalized linear
/// blend if the quaternions are too close for slerp to be stable.
#[must_use]
pub fn slerp(start: &glm::Quat, end: &glm::Quat, t: f32) -> glm::Quat {
    let a = UnitQuaternion::new_normalize(*start);
    let b = UnitQuaternion::new_normalize(*end);
    a.try_slerp(&b, t, f32::EPSILON).map_or_else(
        || {
            // Same hemisphere as `a` for the linear fallback
            let b = if a.coords.dot(&b.coords) < 0.0 { -*b } else { *b };
            glm::quat_normalize(&(a.into_inner() * (1.0 - t) + b * t))
        },
        UnitQuaternion::into_inner,
    )
}

#[must_use]
pub fn interpolate_position(
    keys: &[Key<glm::Vec3>],
    time: f32,
) -> Option<glm::Vec3> {
    sample(keys, time, |a, b, t| glm::lerp(a, b, t))
}

#[must_use]
pub fn interpolate_scale(
    keys: &[Key<glm::Vec3>],
    time: f32,
) -> Option<glm::Vec3> {
    sample(keys, time, |a, b, t| glm::lerp(a, b, t))
}

/// Interpolated rotation, normalized to remove floating point drift
#[must_use]
pub fn interpolate_rotation(
    keys: &[Key<glm::Quat>],
    time: f32,
) -> Option<glm::Quat> {
    sample(keys, time, |a, b, t| slerp(a, b, t))
        .map(|q| glm::quat_normalize(&q))
}

/// Local transform of an animated node at `time` ticks, composed as
/// translation * rotation * scale. Returns `None` if any track is empty.
#[must_use]
pub fn local_transform(channel: &NodeChannel, time: f32) -> Option<glm::Mat4> {
    let translation = interpolate_position(&channel.positions, time)?;
    let rotation = interpolate_rotation(&channel.rotations, time)?;
    let scale = interpolate_scale(&channel.scales, time)?;
    Some(
        glm::translation(&translation)
            * glm::quat_to_mat4(&rotation)
            * glm::scaling(&scale),
    )
}
