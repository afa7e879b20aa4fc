//! Asset Pipeline Tests
//!
//! Tests for:
//! - ModelPrefab instantiation into a live scene
//! - Multi-primitive mesh expansion
//! - Skeleton wiring and teardown through the prefab root
//! - Default morph weight initialization

use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use marionette::assets::{ModelPrefab, PrefabNode, PrefabSkeleton};
use marionette::resources::{Geometry, Material, Mesh, MorphTarget};
use marionette::scene::Scene;

fn plain_node(name: &str) -> PrefabNode {
    PrefabNode {
        name: name.to_string(),
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        children: Vec::new(),
        meshes: Vec::new(),
        skin: None,
        morph_weights: Vec::new(),
    }
}

fn triangle(name: &str) -> Mesh {
    Mesh::new(
        name,
        Arc::new(Geometry::new(
            name,
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
        )),
        Material::default(),
    )
}

#[test]
fn instantiate_builds_hierarchy_under_one_root() {
    let mut torso = plain_node("Torso");
    torso.children = vec![1];
    let head = plain_node("Head");

    let prefab = ModelPrefab {
        name: "Robot".to_string(),
        nodes: vec![torso, head],
        roots: vec![0],
        meshes: Vec::new(),
        skins: Vec::new(),
        clips: Vec::new(),
    };

    let mut scene = Scene::new();
    let root = prefab.instantiate(&mut scene);

    assert_eq!(scene.get_node(root).unwrap().name, "Robot");
    assert_eq!(scene.root_nodes, vec![root]);

    let torso = scene.find_node_by_name(root, "Torso").unwrap();
    let head = scene.find_node_by_name(root, "Head").unwrap();
    assert_eq!(scene.get_node(head).unwrap().parent(), Some(torso));
}

#[test]
fn multi_primitive_meshes_become_child_nodes() {
    let mut node = plain_node("Body");
    node.meshes = vec![0, 1];

    let prefab = ModelPrefab {
        name: "Model".to_string(),
        nodes: vec![node],
        roots: vec![0],
        meshes: vec![triangle("prim0"), triangle("prim1")],
        skins: Vec::new(),
        clips: Vec::new(),
    };

    let mut scene = Scene::new();
    let root = prefab.instantiate(&mut scene);

    let body = scene.find_node_by_name(root, "Body").unwrap();
    // The named node keeps its identity for animation targeting; the
    // primitives hang underneath it.
    assert!(scene.get_node(body).unwrap().mesh.is_none());
    assert_eq!(scene.get_node(body).unwrap().children().len(), 2);
    assert_eq!(scene.meshes.len(), 2);
}

#[test]
fn single_primitive_attaches_directly() {
    let mut node = plain_node("Body");
    node.meshes = vec![0];

    let prefab = ModelPrefab {
        name: "Model".to_string(),
        nodes: vec![node],
        roots: vec![0],
        meshes: vec![triangle("prim0")],
        skins: Vec::new(),
        clips: Vec::new(),
    };

    let mut scene = Scene::new();
    let root = prefab.instantiate(&mut scene);

    let body = scene.find_node_by_name(root, "Body").unwrap();
    assert!(scene.get_node(body).unwrap().mesh.is_some());
    assert!(scene.get_node(body).unwrap().children().is_empty());
}

#[test]
fn morph_weights_default_to_zero_per_target() {
    let mut geometry = Geometry::new("face", vec![Vec3::ZERO], vec![Vec3::Y]);
    geometry.morph_targets.push(MorphTarget::default());
    geometry.morph_targets.push(MorphTarget::default());
    geometry.morph_targets.push(MorphTarget::default());

    let mut node = plain_node("Face");
    node.meshes = vec![0];

    let prefab = ModelPrefab {
        name: "Model".to_string(),
        nodes: vec![node],
        roots: vec![0],
        meshes: vec![Mesh::new("face", Arc::new(geometry), Material::default())],
        skins: Vec::new(),
        clips: Vec::new(),
    };

    let mut scene = Scene::new();
    let root = prefab.instantiate(&mut scene);

    let face = scene.find_node_by_name(root, "Face").unwrap();
    assert_eq!(scene.get_node(face).unwrap().morph_weights, vec![0.0; 3]);
}

#[test]
fn skeleton_joints_map_to_instantiated_nodes() {
    let mut hips = plain_node("Hips");
    hips.children = vec![1];
    let spine = plain_node("Spine");
    let mut body = plain_node("Body");
    body.meshes = vec![0];
    body.skin = Some(0);

    let mut geometry = Geometry::new("body", vec![Vec3::ZERO], vec![Vec3::Y]);
    geometry.joints = Some(vec![[0, 1, 0, 0]]);
    geometry.weights = Some(vec![glam::Vec4::new(0.5, 0.5, 0.0, 0.0)]);

    let prefab = ModelPrefab {
        name: "Skinned".to_string(),
        nodes: vec![hips, spine, body],
        roots: vec![0, 2],
        meshes: vec![Mesh::new("body", Arc::new(geometry), Material::default())],
        skins: vec![PrefabSkeleton {
            name: "Skin".to_string(),
            joints: vec![0, 1],
            inverse_bind_matrices: vec![Affine3A::IDENTITY; 2],
        }],
        clips: Vec::new(),
    };

    let mut scene = Scene::new();
    let root = prefab.instantiate(&mut scene);
    assert_eq!(scene.skins.len(), 1);

    let body = scene.find_node_by_name(root, "Body").unwrap();
    let binding = scene.get_node(body).unwrap().skin.expect("skin bound");
    let skeleton = &scene.skins[binding.skeleton];
    assert_eq!(skeleton.bones.len(), 2);

    let hips = scene.find_node_by_name(root, "Hips").unwrap();
    let spine = scene.find_node_by_name(root, "Spine").unwrap();
    assert_eq!(skeleton.bones, vec![hips, spine]);

    // Tearing down the prefab root takes the skeleton with it.
    scene.remove_node(root);
    assert!(scene.skins.is_empty());
    assert!(scene.meshes.is_empty());
}
