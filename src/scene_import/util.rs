use itertools::Itertools;
use log::debug;
use nalgebra_glm as glm;

/// Calculates the face normals from vertex data. These are not very useful
/// by themselves but are needed to calculate the vertex normals.
///
/// The face normals are not normalized so there can be some area weighting
/// when averaged into vertex normals.
#[must_use]
fn calculate_face_normals(
    indices: &[u32],
    positions: &[glm::Vec3],
) -> Vec<glm::Vec3> {
    let mut face_normals = Vec::with_capacity(indices.len() / 3);
    for (i0, i1, i2) in indices.iter().tuples() {
        let (Some(v0), Some(v1), Some(v2)) = (
            positions.get(*i0 as usize),
            positions.get(*i1 as usize),
            positions.get(*i2 as usize),
        ) else {
            face_normals.push(glm::Vec3::zeros());
            continue;
        };
        let va = v1 - v0;
        let vb = v2 - v0;
        face_normals.push(glm::cross(&va, &vb));
    }
    face_normals
}

/// Calculates vertex normals for a triangle list. This is intended for
/// importing meshes that do not contain normals. Each face adds its normal
/// to its three vertices and the sums are normalized. Vertices not used by
/// any face get a zero normal.
#[must_use]
pub fn calculate_normals(
    indices: &[u32],
    positions: &[glm::Vec3],
) -> Vec<glm::Vec3> {
    let face_normals = calculate_face_normals(indices, positions);
    let mut normals = vec![glm::Vec3::zeros(); positions.len()];
    for ((i0, i1, i2), face_normal) in
        indices.iter().tuples().zip(&face_normals)
    {
        for i in [i0, i1, i2] {
            if let Some(n) = normals.get_mut(*i as usize) {
                *n += face_normal;
            }
        }
    }
    for n in &mut normals {
        if glm::length2(n) > 0.0 {
            *n = glm::normalize(n);
        }
    }
    debug!("Calculated {} normals", normals.len());
    normals
}

/// Applies a uniform scale to the translation part of an affine matrix.
/// Scaling every translation in a hierarchy this way, along with the vertex
/// positions, scales the whole model while leaving rotations alone.
#[must_use]
pub fn scale_translation(m: &glm::Mat4, scale: f32) -> glm::Mat4 {
    let mut out = *m;
    for row in 0..3 {
        out[(row, 3)] *= scale;
    }
    out
}
