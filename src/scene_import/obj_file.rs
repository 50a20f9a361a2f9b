use nalgebra_glm as glm;
use smallvec::smallvec;
use std::path::Path;

use super::{
    types::{ImportError, ImportOptions},
    util,
};
use crate::{
    scene::{
        MaterialTexture, Node, Scene, SceneMaterial, SceneMesh, TextureKind,
    },
    sw_error::SwError,
};

use log::{info, warn};

/// Unknown MTL parameter used by some exporters for the emissive map
const EMISSIVE_MAP: &str = "map_Ke";

/// Load a Wavefront OBJ format object from an .obj file. Loads the file into
/// memory and calls `process_obj`. OBJ files have no skeleton or animation
/// so the result is a static scene with one node per OBJ model.
///
/// # Errors
/// May return `SwError`
pub fn load(path: &Path, options: &ImportOptions) -> Result<Scene, SwError> {
    let load_result = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS);
    let name = path
        .file_stem()
        .map_or_else(|| "obj".to_string(), |s| s.to_string_lossy().to_string());
    process_obj(&name, options, load_result)
}

/// Process loaded Wavefront OBJ format data. Called by `load` or can be
/// used with OBJ data loaded or generated some other way.
///
/// # Errors
/// May return `SwError`
pub fn process_obj(
    name: &str,
    options: &ImportOptions,
    load_result: tobj::LoadResult,
) -> Result<Scene, SwError> {
    let (tobj_models, tobj_materials) = load_result?;
    info!("Found {} submeshes", tobj_models.len());

    let scale = options.scale;
    let mut scene = Scene::new(name, glm::Mat4::identity());

    for m in &tobj_models {
        let mesh = &m.mesh;
        let has_normals = !mesh.normals.is_empty();
        if has_normals && (mesh.positions.len() != mesh.normals.len()) {
            Err(ImportError::CountMismatch)?;
        }
        if mesh.indices.len() % 3 != 0 {
            Err(ImportError::NoTriangles)?;
        }
        let pos_count = mesh.positions.len() / 3;
        let has_uv = !mesh.texcoords.is_empty();
        if has_uv && mesh.texcoords.len() / 2 != pos_count {
            Err(ImportError::CountMismatch)?;
        }
        info!(
            "Submesh {} vertices={}, triangles={}, has_normals={}, has_uv={}",
            m.name,
            pos_count,
            mesh.indices.len() / 3,
            has_normals,
            has_uv,
        );

        let positions: Vec<glm::Vec3> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| glm::vec3(p[0], p[1], p[2]) * scale)
            .collect();
        let normals = if has_normals {
            mesh.normals
                .chunks_exact(3)
                .map(|n| glm::vec3(n[0], n[1], n[2]))
                .collect()
        } else if options.generate_normals {
            warn!("Missing normals are being calculated and might be wrong");
            util::calculate_normals(&mesh.indices, &positions)
        } else {
            Vec::new()
        };
        let tex_coords = mesh
            .texcoords
            .chunks_exact(2)
            .map(|t| {
                if options.flip_uvs {
                    [t[0], 1.0 - t[1]]
                } else {
                    [t[0], t[1]]
                }
            })
            .collect();

        let node = scene
            .add_node(scene.root, Node::new(&m.name, glm::Mat4::identity()));
        scene.add_mesh(
            node,
            SceneMesh {
                name: m.name.clone(),
                positions,
                normals,
                tex_coords,
                faces: mesh
                    .indices
                    .chunks_exact(3)
                    .map(|f| smallvec![f[0], f[1], f[2]])
                    .collect(),
                material_index: mesh.material_id,
                bones: Vec::new(),
            },
        );
    }

    // Materials
    scene.materials = tobj_materials
        .unwrap_or_default()
        .iter()
        .map(|m| {
            let candidates = [
                (TextureKind::Diffuse, m.diffuse_texture.as_str()),
                (TextureKind::Specular, m.specular_texture.as_str()),
                (TextureKind::Normal, m.normal_texture.as_str()),
                (
                    TextureKind::Emission,
                    m.unknown_param
                        .get(EMISSIVE_MAP)
                        .map_or("", String::as_str),
                ),
            ];
            let textures: Vec<MaterialTexture> = candidates
                .iter()
                .filter(|(_, path)| !path.is_empty())
                .map(|(kind, path)| MaterialTexture {
                    kind: *kind,
                    path: (*path).to_string(),
                })
                .collect();
            info!(
                "Processing material {:?} with textures {:?}",
                m.name, textures
            );
            SceneMaterial {
                name: m.name.clone(),
                textures,
            }
        })
        .collect();

    Ok(scene)
}
