//! Scene Graph Tests
//!
//! Tests for:
//! - Node hierarchy (add / attach / remove with component cleanup)
//! - World matrix propagation and dirty tracking
//! - Name lookup scoped to a subtree
//! - Skeleton joint matrix computation
//! - Camera projection and aspect guarding

use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use marionette::resources::{Geometry, Material, Mesh};
use marionette::scene::{Camera, Node, Scene, Skeleton, SkinBinding};
use std::sync::Arc;

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn quad_mesh(name: &str) -> Mesh {
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

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn add_and_remove_node() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    assert_eq!(scene.root_nodes.len(), 1);

    scene.remove_node(a);
    assert!(scene.get_node(a).is_none());
    assert!(scene.root_nodes.is_empty());
}

#[test]
fn remove_node_takes_subtree_and_components() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("root"));
    let mesh_node = scene.add_mesh(quad_mesh("quad"));
    scene.attach(mesh_node, root);

    assert_eq!(scene.meshes.len(), 1);
    scene.remove_node(root);

    assert!(scene.get_node(mesh_node).is_none());
    assert!(scene.meshes.is_empty());
}

#[test]
fn attach_reparents_and_updates_world() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_node(Node::new("child"));

    scene.get_node_mut(parent).unwrap().transform.position = Vec3::new(5.0, 0.0, 0.0);
    scene.get_node_mut(child).unwrap().transform.position = Vec3::new(0.0, 3.0, 0.0);

    scene.attach(child, parent);
    assert_eq!(scene.root_nodes.len(), 1);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));

    scene.update();
    let world = scene.get_node(child).unwrap().transform.world_matrix();
    assert!(approx_vec3(
        Vec3::from(world.translation),
        Vec3::new(5.0, 3.0, 0.0)
    ));
}

#[test]
fn world_matrices_propagate_through_three_levels() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    let b = scene.add_to_parent(Node::new("b"), a);
    let c = scene.add_to_parent(Node::new("c"), b);

    scene.get_node_mut(a).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
    scene.get_node_mut(b).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
    scene.get_node_mut(c).unwrap().transform.position = Vec3::new(0.0, 0.0, 3.0);

    scene.update();
    let world = scene.get_node(c).unwrap().transform.world_matrix();
    assert!(approx_vec3(
        Vec3::from(world.translation),
        Vec3::new(1.0, 2.0, 3.0)
    ));
}

#[test]
fn parent_scale_applies_to_children() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let child = scene.add_to_parent(Node::new("child"), parent);

    scene.get_node_mut(parent).unwrap().transform.scale = Vec3::splat(2.0);
    scene.get_node_mut(child).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);

    scene.update();
    let world = scene.get_node(child).unwrap().transform.world_matrix();
    assert!(approx_vec3(
        Vec3::from(world.translation),
        Vec3::new(2.0, 0.0, 0.0)
    ));
}

#[test]
fn find_node_by_name_is_subtree_scoped() {
    let mut scene = Scene::new();
    let tree_a = scene.add_node(Node::new("root_a"));
    let hips_a = scene.add_to_parent(Node::new("Hips"), tree_a);
    let tree_b = scene.add_node(Node::new("root_b"));
    let hips_b = scene.add_to_parent(Node::new("Hips"), tree_b);

    assert_eq!(scene.find_node_by_name(tree_a, "Hips"), Some(hips_a));
    assert_eq!(scene.find_node_by_name(tree_b, "Hips"), Some(hips_b));
    assert_eq!(scene.find_node_by_name(tree_a, "Missing"), None);
}

// ============================================================================
// Skeleton
// ============================================================================

#[test]
fn identity_pose_yields_identity_joint_matrices() {
    let mut scene = Scene::new();
    let skinned = scene.add_node(Node::new("Body"));
    let bone = scene.add_to_parent(Node::new("Bone"), skinned);

    let skeleton = scene.add_skeleton(Skeleton::new(
        "Skin",
        vec![bone],
        vec![Affine3A::IDENTITY],
    ));
    scene.get_node_mut(skinned).unwrap().skin = Some(SkinBinding { skeleton });

    scene.update();
    let joints = scene.skins[skeleton].joint_matrices();
    assert_eq!(joints.len(), 1);
    assert!((joints[0] - Mat4::IDENTITY).abs_diff_eq(Mat4::ZERO, EPSILON));
}

#[test]
fn bone_translation_shows_up_in_joint_matrix() {
    let mut scene = Scene::new();
    let skinned = scene.add_node(Node::new("Body"));
    let bone = scene.add_to_parent(Node::new("Bone"), skinned);

    let skeleton = scene.add_skeleton(Skeleton::new(
        "Skin",
        vec![bone],
        vec![Affine3A::IDENTITY],
    ));
    scene.get_node_mut(skinned).unwrap().skin = Some(SkinBinding { skeleton });
    scene.get_node_mut(bone).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);

    scene.update();
    let joint = scene.skins[skeleton].joint_matrices()[0];
    let moved = joint.transform_point3(Vec3::ZERO);
    assert!(approx_vec3(moved, Vec3::new(0.0, 2.0, 0.0)));
}

#[test]
fn joint_matrices_are_relative_to_the_skinned_node() {
    let mut scene = Scene::new();
    let skinned = scene.add_node(Node::new("Body"));
    let bone = scene.add_to_parent(Node::new("Bone"), skinned);

    let skeleton = scene.add_skeleton(Skeleton::new(
        "Skin",
        vec![bone],
        vec![Affine3A::IDENTITY],
    ));
    scene.get_node_mut(skinned).unwrap().skin = Some(SkinBinding { skeleton });

    // Moving the whole model must not deform it.
    scene.get_node_mut(skinned).unwrap().transform.position = Vec3::new(100.0, 0.0, 0.0);

    scene.update();
    let joint = scene.skins[skeleton].joint_matrices()[0];
    assert!((joint - Mat4::IDENTITY).abs_diff_eq(Mat4::ZERO, EPSILON));
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn perspective_projection_is_well_formed() {
    let camera = Camera::new_perspective(45.0, 16.0 / 9.0, 1.0, 2000.0);
    let proj = camera.projection_matrix();

    // A point on the near plane in front of the camera lands at z >= 0.
    let near_point = proj * Vec4::new(0.0, 0.0, -1.0, 1.0);
    assert!(near_point.z.abs() < EPSILON);
}

#[test]
fn set_aspect_rejects_degenerate_values() {
    let mut camera = Camera::new_perspective(45.0, 1.0, 1.0, 2000.0);

    camera.set_aspect(0.0);
    camera.set_aspect(-2.0);
    camera.set_aspect(f32::NAN);
    assert!((camera.aspect - 1.0).abs() < EPSILON);

    camera.set_aspect(1.5);
    assert!((camera.aspect - 1.5).abs() < EPSILON);
}

#[test]
fn view_matrix_inverts_camera_world() {
    let mut transform = marionette::scene::Transform::new();
    transform.position = Vec3::new(0.0, 0.0, 10.0);
    transform.rotation = Quat::IDENTITY;
    transform.update_local_matrix();

    let world = *transform.local_matrix();
    let view = Camera::view_matrix(&world);

    // The camera's own position maps to the view-space origin.
    let origin = view.transform_point3(Vec3::new(0.0, 0.0, 10.0));
    assert!(approx_vec3(origin, Vec3::ZERO));
}
