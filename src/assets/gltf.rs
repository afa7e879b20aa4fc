use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::animation::values::MorphWeightData;
use crate::assets::decoder::ModelDecoder;
use crate::assets::prefab::{ModelPrefab, PrefabNode, PrefabSkeleton};
use crate::errors::Result;
use crate::resources::{Geometry, Material, Mesh, MorphTarget, MAX_MORPH_TARGETS};

/// glTF 2.0 / GLB decoder.
pub struct GltfDecoder;

impl ModelDecoder for GltfDecoder {
    fn extensions(&self) -> &[&str] {
        &["gltf", "glb"]
    }

    fn decode(&self, path: &Path, name: &str) -> Result<ModelPrefab> {
        let (document, buffers, _images) = gltf::import(path)?;
        decode_document(&document, &buffers, name)
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Node_{}", node.index()))
}

fn decode_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    name: &str,
) -> Result<ModelPrefab> {
    let materials = decode_materials(document);

    // Mesh primitives flatten into one list; nodes reference it by index.
    let mut meshes = Vec::new();
    let mut mesh_primitives: HashMap<usize, Vec<usize>> = HashMap::new();
    for mesh in document.meshes() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Mesh_{}", mesh.index()));

        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            let geometry = decode_geometry(&primitive, buffers, &mesh_name)?;
            let material = primitive
                .material()
                .index()
                .and_then(|i| materials.get(i).cloned())
                .unwrap_or_default();

            indices.push(meshes.len());
            meshes.push(Mesh::new(mesh_name.clone(), Arc::new(geometry), material));
        }
        mesh_primitives.insert(mesh.index(), indices);
    }

    let nodes = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            PrefabNode {
                name: node_name(&node),
                translation: Vec3::from_array(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from_array(scale),
                children: node.children().map(|c| c.index()).collect(),
                meshes: node
                    .mesh()
                    .and_then(|m| mesh_primitives.get(&m.index()).cloned())
                    .unwrap_or_default(),
                skin: node.skin().map(|s| s.index()),
                morph_weights: node
                    .mesh()
                    .and_then(|m| m.weights())
                    .map(<[f32]>::to_vec)
                    .unwrap_or_default(),
            }
        })
        .collect();

    let skins = decode_skins(document, buffers);
    let clips = decode_animations(document, buffers);

    let roots = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .map(|scene| scene.nodes().map(|n| n.index()).collect())
        .unwrap_or_default();

    Ok(ModelPrefab {
        name: name.to_string(),
        nodes,
        roots,
        meshes,
        skins,
        clips,
    })
}

fn decode_materials(document: &gltf::Document) -> Vec<Material> {
    document
        .materials()
        .map(|material| Material {
            name: material.name().unwrap_or("Material").to_string(),
            color: Vec4::from_array(material.pbr_metallic_roughness().base_color_factor()),
            unlit: material.unlit(),
        })
        .collect()
}

fn decode_geometry(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    mesh_name: &str,
) -> Result<Geometry> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .map(|iter| iter.map(Vec3::from_array).collect())
        .unwrap_or_default();

    let indices: Option<Vec<u32>> = reader.read_indices().map(|iter| iter.into_u32().collect());

    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(iter) => iter.map(Vec3::from_array).collect(),
        None => compute_flat_normals(&positions, indices.as_deref()),
    };

    let mut geometry = Geometry::new(mesh_name, positions, normals);
    geometry.indices = indices;

    if let Some(iter) = reader.read_joints(0) {
        geometry.joints = Some(iter.into_u16().collect());
    }
    if let Some(iter) = reader.read_weights(0) {
        geometry.weights = Some(iter.into_f32().map(Vec4::from_array).collect());
    }

    for (i, (positions, normals, _tangents)) in reader.read_morph_targets().enumerate() {
        if i >= MAX_MORPH_TARGETS {
            log::warn!(
                "Mesh '{mesh_name}': more than {MAX_MORPH_TARGETS} morph targets, extras dropped"
            );
            break;
        }
        let target = MorphTarget {
            position_deltas: positions
                .map(|iter| iter.map(Vec3::from_array).collect())
                .unwrap_or_default(),
            normal_deltas: normals
                .map(|iter| iter.map(Vec3::from_array).collect())
                .unwrap_or_default(),
        };
        geometry.morph_targets.push(target);
    }

    Ok(geometry)
}

/// Area-weighted face normals, for meshes that ship without them.
fn compute_flat_normals(positions: &[Vec3], indices: Option<&[u32]>) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    let mut accumulate = |a: usize, b: usize, c: usize| {
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    };

    match indices {
        Some(indices) => {
            for tri in indices.chunks_exact(3) {
                accumulate(tri[0] as usize, tri[1] as usize, tri[2] as usize);
            }
        }
        None => {
            for i in (0..positions.len()).step_by(3) {
                if i + 2 < positions.len() {
                    accumulate(i, i + 1, i + 2);
                }
            }
        }
    }

    for normal in &mut normals {
        *normal = normal.normalize_or(Vec3::Y);
    }
    normals
}

fn decode_skins(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<PrefabSkeleton> {
    document
        .skins()
        .map(|skin| {
            let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();

            let inverse_bind_matrices: Vec<Affine3A> = reader
                .read_inverse_bind_matrices()
                .map(|iter| {
                    iter.map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                        .collect()
                })
                .unwrap_or_else(|| vec![Affine3A::IDENTITY; joints.len()]);

            PrefabSkeleton {
                name: skin
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Skin_{}", skin.index())),
                joints,
                inverse_bind_matrices,
            }
        })
        .collect()
}

fn decode_animations(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Vec<Arc<AnimationClip>> {
    let mut clips = Vec::new();

    for animation in document.animations() {
        let mut tracks = Vec::new();

        for channel in animation.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let target = channel.target();
            let target_name = node_name(&target.node());

            let Some(inputs) = reader.read_inputs() else {
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            if times.is_empty() {
                continue;
            }

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let Some(outputs) = reader.read_outputs() else {
                continue;
            };

            use gltf::animation::util::ReadOutputs;
            let track = match (target.property(), outputs) {
                (gltf::animation::Property::Translation, ReadOutputs::Translations(iter)) => {
                    let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                    Track {
                        meta: TrackMeta {
                            node_name: target_name,
                            target: TargetPath::Translation,
                        },
                        data: TrackData::Vector3(KeyframeTrack::new(times, values, interpolation)),
                    }
                }
                (gltf::animation::Property::Rotation, ReadOutputs::Rotations(iter)) => {
                    let values: Vec<Quat> = iter.into_f32().map(Quat::from_array).collect();
                    Track {
                        meta: TrackMeta {
                            node_name: target_name,
                            target: TargetPath::Rotation,
                        },
                        data: TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            values,
                            interpolation,
                        )),
                    }
                }
                (gltf::animation::Property::Scale, ReadOutputs::Scales(iter)) => {
                    let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                    Track {
                        meta: TrackMeta {
                            node_name: target_name,
                            target: TargetPath::Scale,
                        },
                        data: TrackData::Vector3(KeyframeTrack::new(times, values, interpolation)),
                    }
                }
                (
                    gltf::animation::Property::MorphTargetWeights,
                    ReadOutputs::MorphTargetWeights(iter),
                ) => {
                    let flat: Vec<f32> = iter.into_f32().collect();

                    // CubicSpline carries (in_tangent, value, out_tangent)
                    // triples per keyframe, so the frame count differs.
                    let frames = match interpolation {
                        InterpolationMode::CubicSpline => times.len() * 3,
                        _ => times.len(),
                    };
                    let weights_per_frame = if frames > 0 { flat.len() / frames } else { 0 };

                    let mut values = Vec::with_capacity(frames);
                    for frame in 0..frames {
                        let mut pod = MorphWeightData::default();
                        let start = frame * weights_per_frame;
                        let count = weights_per_frame.min(MAX_MORPH_TARGETS);
                        pod.weights[..count].copy_from_slice(&flat[start..start + count]);
                        values.push(pod);
                    }

                    Track {
                        meta: TrackMeta {
                            node_name: target_name,
                            target: TargetPath::Weights,
                        },
                        data: TrackData::MorphWeights(KeyframeTrack::new(
                            times,
                            values,
                            interpolation,
                        )),
                    }
                }
                _ => continue,
            };

            tracks.push(track);
        }

        let clip_name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Animation_{}", animation.index()));
        clips.push(Arc::new(AnimationClip::new(clip_name, tracks)));
    }

    clips
}
