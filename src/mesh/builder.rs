use super::{Mesh, Vertex};
use crate::{
    scene::{SceneMaterial, SceneMesh},
    skeleton::BoneRegistry,
    texture::{Texture, TextureKind, TextureManager},
};
use log::{debug, trace, warn};
use smallvec::SmallVec;
use std::path::Path;

/// Converts an imported mesh into a renderable `Mesh`.
///
/// Bones named by the mesh are bound in `registry`. A bone seen for the
/// first time gets its offset from this mesh; a bone already bound by an
/// earlier mesh keeps the offset it was given then. Each vertex stores up
/// to four influences and any further ones are dropped.
///
/// Textures are loaded through `textures` relative to `directory`. A
/// texture that fails to load is left out of the mesh.
pub fn build(
    scene_mesh: &SceneMesh,
    materials: &[SceneMaterial],
    registry: &mut BoneRegistry,
    textures: &TextureManager,
    directory: &Path,
) -> Mesh {
    let mut vertices: Vec<Vertex> = scene_mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: [p.x, p.y, p.z],
            normal: scene_mesh
                .normals
                .get(i)
                .map_or([0.0; 3], |n| [n.x, n.y, n.z]),
            tex_coord: scene_mesh
                .tex_coords
                .get(i)
                .copied()
                .unwrap_or_default(),
            ..Default::default()
        })
        .collect();

    skin(scene_mesh, registry, &mut vertices);

    let indices: Vec<u32> =
        scene_mesh.faces.iter().flatten().copied().collect();

    let textures = scene_mesh
        .material_index
        .and_then(|i| materials.get(i))
        .map(|m| load_textures(m, textures, directory))
        .unwrap_or_default();

    debug!(
        "Mesh {} built: {} vertices, {} indices, {} textures",
        scene_mesh.name,
        vertices.len(),
        indices.len(),
        textures.len()
    );

    Mesh {
        name: scene_mesh.name.clone(),
        vertices,
        indices,
        textures,
    }
}

fn skin(
    scene_mesh: &SceneMesh,
    registry: &mut BoneRegistry,
    vertices: &mut [Vertex],
) {
    for bone in &scene_mesh.bones {
        let is_new = !registry.contains(&bone.name);
        let index = registry.bind(&bone.name);
        if is_new {
            registry.set_offset(index, bone.offset);
        }
        let Ok(bone_id) = i32::try_from(index) else {
            warn!("Bone index {} for {} does not fit", index, bone.name);
            continue;
        };

        for w in &bone.weights {
            let Some(vertex) = usize::try_from(w.vertex_id)
                .ok()
                .and_then(|v| vertices.get_mut(v))
            else {
                warn!(
                    "Bone {} weights vertex {} of mesh {} with {} vertices",
                    bone.name,
                    w.vertex_id,
                    scene_mesh.name,
                    scene_mesh.positions.len()
                );
                continue;
            };
            if !vertex.add_bone(bone_id, w.weight) {
                trace!(
                    "Vertex {} already has 4 bones, dropped {}",
                    w.vertex_id,
                    bone.name
                );
            }
        }
    }
}

fn load_textures(
    material: &SceneMaterial,
    textures: &TextureManager,
    directory: &Path,
) -> SmallVec<[Texture; 4]> {
    let mut out = SmallVec::new();
    for kind in TextureKind::ALL {
        for path in material.textures_of(kind) {
            let handle = textures.load(path, directory);
            if handle.is_null() {
                continue;
            }
            out.push(Texture {
                handle,
                kind,
                path: path.to_string(),
            });
        }
    }
    out
}
