// Some code inspired by
// https://github.com/KhronosGroup/glTF-Tutorials/

use super::{
    types::{ImportError, ImportOptions},
    util,
};
use crate::{
    scene::{
        AnimationClip, Key, MaterialTexture, Node, NodeChannel, Scene,
        SceneBone, SceneMaterial, SceneMesh, TextureKind, VertexWeight,
    },
    sw_error::SwError,
};
use ahash::{HashMap, HashMapExt};
use gltf::{
    animation::{util::ReadOutputs, Interpolation, Property},
    buffer::{self, Data},
    image::Source,
    mesh::Mode,
    Document, Gltf, Primitive, Semantic,
};
use log::{debug, error, info, trace, warn};
use nalgebra_glm as glm;
use smallvec::smallvec;
use std::{fs, io, path::Path};

/// glTF keyframe times are in seconds, so one tick is one second
const GLTF_TICKS_PER_SECOND: f32 = 1.0;

/// Name of the node created when a glTF scene has several root nodes
const SYNTHETIC_ROOT: &str = "gltf.root";

/// Static transform of a node, used to fill tracks that an animation does
/// not drive
#[derive(Clone, Copy, Debug)]
struct Trs {
    translation: glm::Vec3,
    rotation: glm::Quat,
    scale: glm::Vec3,
}

/// Per node animation data collected from glTF channels, which each drive a
/// single property of a single node
#[derive(Default)]
struct RawChannel {
    positions: Option<Vec<Key<glm::Vec3>>>,
    rotations: Option<Vec<Key<glm::Quat>>>,
    scales: Option<Vec<Key<glm::Vec3>>>,
}

fn load_impl<P>(path: P) -> Result<(Document, Vec<buffer::Data>), SwError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let base = path.parent().unwrap_or_else(|| Path::new("./"));
    let file = fs::File::open(path).map_err(SwError::StdIoError)?;
    let reader = io::BufReader::new(file);
    let gltf = Gltf::from_reader(reader)?;
    let buffers = gltf::import_buffers(&gltf.document, Some(base), gltf.blob)?;

    // Some info
    info!(
        "{:?}, base path={:?}, buffer count={}",
        path,
        base,
        buffers.len(),
    );

    Ok((gltf.document, buffers))
}

/// Load a glTF file into a `Scene`. Images are not loaded here, only the
/// names of the texture files, which must be referenced by URI.
///
/// # Errors
/// May return `SwError`
pub fn load(path: &Path, options: &ImportOptions) -> Result<Scene, SwError> {
    let (document, buffers) = load_impl(path)?;
    process_gltf(&document, &buffers, options)
}

/// Converts a loaded glTF document into a `Scene`
///
/// # Errors
/// May return `SwError`
pub fn process_gltf(
    document: &Document,
    buffers: &[Data],
    options: &ImportOptions,
) -> Result<Scene, SwError> {
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ImportError::NoScene)?;
    let roots: Vec<gltf::Node> = gltf_scene.nodes().collect();

    // A single root node is used directly, otherwise they are all placed
    // under a new identity root
    let (mut scene, node_map) = if let [single] = roots.as_slice() {
        let mut scene = Scene::new(
            &node_name(single),
            util::scale_translation(
                &single.transform().matrix().into(),
                options.scale,
            ),
        );
        let mut node_map = HashMap::new();
        node_map.insert(single.index(), scene.root);
        for child in single.children() {
            add_tree(&child, scene.root, &mut scene, &mut node_map, options);
        }
        (scene, node_map)
    } else {
        let mut scene = Scene::new(SYNTHETIC_ROOT, glm::Mat4::identity());
        let mut node_map = HashMap::new();
        for root in &roots {
            add_tree(root, scene.root, &mut scene, &mut node_map, options);
        }
        (scene, node_map)
    };
    info!("nodes={}", scene.nodes.len());

    // Meshes are attached to the node that references them. Nodes outside
    // of the chosen scene are ignored.
    let mut gltf_nodes: Vec<gltf::Node> = document
        .nodes()
        .filter(|n| node_map.contains_key(&n.index()))
        .collect();
    gltf_nodes.sort_by_key(gltf::Node::index);
    for node in &gltf_nodes {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let scene_node = node_map[&node.index()];
        let skin_bones = node
            .skin()
            .map(|skin| load_skin(&skin, buffers, options))
            .transpose()?;
        for p in mesh.primitives() {
            let name = mesh.name().map_or_else(
                || format!("mesh.{}.{}", mesh.index(), p.index()),
                |n| format!("{n}.{}", p.index()),
            );
            let scene_mesh = load_primitive(
                &p,
                &name,
                buffers,
                skin_bones.as_deref(),
                options,
            )?;
            scene.add_mesh(scene_node, scene_mesh);
        }
    }

    scene.materials = load_materials(document);
    scene.animations = load_animations(document, buffers, options)?;
    Ok(scene)
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("node.{}", node.index()), ToString::to_string)
}

/// Recursive node tree traversal
fn add_tree(
    node: &gltf::Node,
    parent: usize,
    scene: &mut Scene,
    node_map: &mut HashMap<usize, usize>,
    options: &ImportOptions,
) {
    if node_map.contains_key(&node.index()) {
        warn!("node {} is referenced more than once", node.index());
        return;
    }
    let transform = util::scale_translation(
        &node.transform().matrix().into(),
        options.scale,
    );
    let index = scene.add_node(parent, Node::new(&node_name(node), transform));
    node_map.insert(node.index(), index);
    for child in node.children() {
        add_tree(&child, index, scene, node_map, options);
    }
}

/// Joint names and offset matrices for a skin, in joint order
fn load_skin(
    skin: &gltf::Skin,
    buffers: &[Data],
    options: &ImportOptions,
) -> Result<Vec<(String, glm::Mat4)>, SwError> {
    let reader = skin.reader(|x| Some(buffers[x.index()].0.as_slice()));
    let joint_count = skin.joints().count();
    let ibms: Vec<glm::Mat4> = reader.read_inverse_bind_matrices().map_or_else(
        || {
            // The glTF specification says these are identity when missing
            warn!("skin {} has no inverse bind matrices", skin.index());
            vec![glm::Mat4::identity(); joint_count]
        },
        |iter| iter.map(Into::into).collect(),
    );
    if ibms.len() != joint_count {
        error!(
            "skin {} has {} joints but {} inverse bind matrices",
            skin.index(),
            joint_count,
            ibms.len()
        );
        return Err(ImportError::CountMismatch.into());
    }
    Ok(skin
        .joints()
        .zip(ibms)
        .map(|(joint, ibm)| {
            (node_name(&joint), util::scale_translation(&ibm, options.scale))
        })
        .collect())
}

fn load_primitive(
    p: &Primitive,
    name: &str,
    buffers: &[Data],
    skin_bones: Option<&[(String, glm::Mat4)]>,
    options: &ImportOptions,
) -> Result<SceneMesh, SwError> {
    if p.mode() != Mode::Triangles {
        error!("{name} is not a triangle mesh");
        return Err(ImportError::NoTriangles.into());
    }
    if p.get(&Semantic::Positions).is_none() {
        return Err(ImportError::NoPositions.into());
    }
    let reader = p.reader(|x| Some(buffers[x.index()].0.as_slice()));
    let scale = options.scale;

    let positions: Vec<glm::Vec3> = reader
        .read_positions()
        .ok_or(ImportError::NoPositions)?
        .map(|v| glm::vec3(v[0], v[1], v[2]) * scale)
        .collect();
    let vert_count = positions.len();

    let indices: Vec<u32> = reader
        .read_indices()
        .ok_or(ImportError::NoIndices)?
        .into_u32()
        .collect();
    if indices.len() % 3 != 0 {
        return Err(ImportError::NoTriangles.into());
    }

    let mut normals: Vec<glm::Vec3> = reader
        .read_normals()
        .map(|it| it.map(|n| glm::vec3(n[0], n[1], n[2])).collect())
        .unwrap_or_default();
    if normals.is_empty() {
        if options.generate_normals {
            warn!("{name} has no normals, calculating them");
            normals = util::calculate_normals(&indices, &positions);
        }
    } else if normals.len() != vert_count {
        return Err(ImportError::CountMismatch.into());
    }

    let tex_coords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|uv| {
            uv.into_f32()
                .map(|[u, v]| {
                    if options.flip_uvs {
                        [u, 1.0 - v]
                    } else {
                        [u, v]
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    if !tex_coords.is_empty() && tex_coords.len() != vert_count {
        return Err(ImportError::CountMismatch.into());
    }

    let bones = match (
        skin_bones,
        reader.read_joints(0),
        reader.read_weights(0),
    ) {
        (Some(skin_bones), Some(joints), Some(weights)) => {
            let mut bones: Vec<SceneBone> = skin_bones
                .iter()
                .map(|(bone_name, offset)| SceneBone {
                    name: bone_name.clone(),
                    offset: *offset,
                    weights: Vec::new(),
                })
                .collect();
            for (vertex_id, (ids, ws)) in
                joints.into_u16().zip(weights.into_f32()).enumerate()
            {
                let vertex_id = u32::try_from(vertex_id)
                    .map_err(|_| SwError::VertexCountTooLarge)?;
                for (joint, weight) in ids.iter().zip(ws) {
                    if weight <= 0.0 {
                        continue;
                    }
                    if let Some(bone) = bones.get_mut(usize::from(*joint)) {
                        bone.weights.push(VertexWeight { vertex_id, weight });
                    } else {
                        warn!(
                            "{name} vertex {vertex_id} uses missing joint {joint}"
                        );
                    }
                }
            }
            bones
        }
        (None, Some(_), _) => {
            warn!("{name} has joints but its node has no skin");
            Vec::new()
        }
        _ => Vec::new(),
    };

    info!(
        "Submesh={}, Index count={}, Vertex count={}, Has UV={}, Bones={}",
        name,
        indices.len(),
        vert_count,
        !tex_coords.is_empty(),
        bones.len(),
    );

    Ok(SceneMesh {
        name: name.to_string(),
        positions,
        normals,
        tex_coords,
        faces: indices
            .chunks_exact(3)
            .map(|f| smallvec![f[0], f[1], f[2]])
            .collect(),
        material_index: p.material().index(),
        bones,
    })
}

fn texture_uri(texture: &gltf::Texture) -> Option<String> {
    match texture.source().source() {
        Source::Uri { uri, mime_type: _ } => Some(uri.to_string()),
        Source::View { .. } => {
            warn!("embedded image for texture {} ignored", texture.index());
            None
        }
    }
}

fn load_materials(document: &Document) -> Vec<SceneMaterial> {
    info!("Materials={}", document.materials().count());
    document
        .materials()
        .map(|m| {
            let pbr = m.pbr_metallic_roughness();
            let candidates = [
                (
                    TextureKind::Diffuse,
                    pbr.base_color_texture().map(|t| t.texture()),
                ),
                (
                    TextureKind::Specular,
                    pbr.metallic_roughness_texture().map(|t| t.texture()),
                ),
                (TextureKind::Normal, m.normal_texture().map(|t| t.texture())),
                (
                    TextureKind::Emission,
                    m.emissive_texture().map(|t| t.texture()),
                ),
            ];
            let textures: Vec<MaterialTexture> = candidates
                .iter()
                .filter_map(|(kind, texture)| {
                    texture.as_ref().and_then(texture_uri).map(|path| {
                        MaterialTexture { kind: *kind, path }
                    })
                })
                .collect();
            let name = m.name().map_or_else(
                || format!("material.{}", m.index().unwrap_or(0)),
                ToString::to_string,
            );
            debug!("Material name={} textures={:?}", name, textures);
            SceneMaterial { name, textures }
        })
        .collect()
}

fn keys<T>(times: &[f32], values: impl Iterator<Item = T>) -> Vec<Key<T>> {
    times
        .iter()
        .zip(values)
        .map(|(time, value)| Key::new(*time, value))
        .collect()
}

/// Cubic spline samplers store an in tangent, value and out tangent for
/// each key. Only the values are kept, and they are played back linearly.
fn spline_values<T>(
    values: impl Iterator<Item = T>,
    interpolation: Interpolation,
) -> Box<dyn Iterator<Item = T>>
where
    T: 'static,
{
    let values: Vec<T> = values.collect();
    if interpolation == Interpolation::CubicSpline {
        Box::new(values.into_iter().skip(1).step_by(3))
    } else {
        Box::new(values.into_iter())
    }
}

fn static_trs(node: &gltf::Node, scale: f32) -> Trs {
    let (t, r, s) = node.transform().decomposed();
    Trs {
        translation: glm::vec3(t[0], t[1], t[2]) * scale,
        rotation: glm::quat(r[0], r[1], r[2], r[3]),
        scale: glm::vec3(s[0], s[1], s[2]),
    }
}

fn load_animations(
    document: &Document,
    buffers: &[Data],
    options: &ImportOptions,
) -> Result<Vec<AnimationClip>, SwError> {
    let mut ret = Vec::new();
    for animation in document.animations() {
        let name = animation.name().map_or_else(
            || format!("animation.{}", animation.index()),
            ToString::to_string,
        );
        debug!("animation name={}", name);

        // Keyed by glTF node index. The order of first appearance is kept
        // since the first channel sets the clip duration.
        let mut order = Vec::new();
        let mut raw = HashMap::<usize, (Trs, RawChannel)>::new();

        for channel in animation.channels() {
            let node = channel.target().node();
            let interpolation = channel.sampler().interpolation();
            if interpolation == Interpolation::CubicSpline {
                warn!(
                    "{} node {} cubic spline played as linear",
                    name,
                    node.index()
                );
            }
            let reader =
                channel.reader(|x| Some(buffers[x.index()].0.as_slice()));
            let times: Vec<f32> = reader
                .read_inputs()
                .ok_or(SwError::UnsupportedFormat)?
                .collect();
            let Some(outputs) = reader.read_outputs() else {
                error!("Animation does not contain a sampler output");
                return Err(SwError::UnsupportedFormat);
            };
            if matches!(
                channel.target().property(),
                Property::MorphTargetWeights
            ) {
                warn!("{} node {} morph targets ignored", name, node.index());
                continue;
            }

            let entry = raw.entry(node.index()).or_insert_with(|| {
                order.push(node.index());
                (static_trs(&node, options.scale), RawChannel::default())
            });
            match outputs {
                ReadOutputs::Translations(x) => {
                    let values =
                        x.map(|v| glm::vec3(v[0], v[1], v[2]) * options.scale);
                    entry.1.positions = Some(keys(
                        &times,
                        spline_values(values, interpolation),
                    ));
                }
                ReadOutputs::Rotations(x) => {
                    let values = x
                        .into_f32()
                        .map(|r| glm::quat(r[0], r[1], r[2], r[3]));
                    entry.1.rotations = Some(keys(
                        &times,
                        spline_values(values, interpolation),
                    ));
                }
                ReadOutputs::Scales(x) => {
                    let values = x.map(|v| glm::vec3(v[0], v[1], v[2]));
                    entry.1.scales = Some(keys(
                        &times,
                        spline_values(values, interpolation),
                    ));
                }
                ReadOutputs::MorphTargetWeights(_) => {}
            }
        }

        // Tracks without data hold the node's static value
        let channels: Vec<NodeChannel> = order
            .iter()
            .filter_map(|index| {
                let (trs, rc) = raw.remove(index)?;
                let node = document.nodes().nth(*index)?;
                trace!("channel node={} trs={:?}", index, trs);
                Some(NodeChannel {
                    node_name: node_name(&node),
                    positions: rc.positions.unwrap_or_else(|| {
                        vec![Key::new(0.0, trs.translation)]
                    }),
                    rotations: rc.rotations.unwrap_or_else(|| {
                        vec![Key::new(0.0, trs.rotation)]
                    }),
                    scales: rc
                        .scales
                        .unwrap_or_else(|| vec![Key::new(0.0, trs.scale)]),
                })
            })
            .collect();

        ret.push(AnimationClip::new(&name, GLTF_TICKS_PER_SECOND, channels));
    }
    info!("Animations={}", ret.len());
    Ok(ret)
}
