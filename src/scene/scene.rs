use glam::{Affine3A, Vec3, Vec4};
use slotmap::SlotMap;

use crate::resources::mesh::Mesh;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle, SkeletonKey};

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

/// Scene graph container.
///
/// Pure data layer: node hierarchy plus component pools. GPU resources are
/// derived from it by the renderer and are never stored here.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub meshes: SlotMap<MeshKey, Mesh>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, Light>,
    pub skins: SlotMap<SkeletonKey, Skeleton>,

    /// Clear color (linear RGBA).
    pub background: Vec4,
    pub fog: Option<Fog>,

    pub active_camera: Option<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            skins: SlotMap::with_key(),
            background: Vec4::new(0.0, 0.0, 0.0, 1.0),
            fog: None,
            active_camera: None,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Inserts a node at the scene root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Inserts a node as a child of `parent`.
    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        if let Some(c) = self.nodes.get_mut(handle) {
            c.parent = Some(parent);
        }
        handle
    }

    /// Removes a node and its entire subtree, cleaning up attached
    /// components (mesh, camera, light, skeleton).
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let children = match self.nodes.get(handle) {
            Some(node) => node.children.clone(),
            None => return,
        };

        for child in children {
            self.remove_node(child);
        }

        let parent_opt = self.nodes.get(handle).and_then(|n| n.parent);
        if let Some(parent) = parent_opt {
            if let Some(p) = self.nodes.get_mut(parent) {
                if let Some(pos) = p.children.iter().position(|&c| c == handle) {
                    p.children.remove(pos);
                }
            }
        } else if let Some(pos) = self.root_nodes.iter().position(|&r| r == handle) {
            self.root_nodes.remove(pos);
        }

        if let Some(node) = self.nodes.get(handle) {
            if let Some(mesh_key) = node.mesh {
                self.meshes.remove(mesh_key);
            }
            if let Some(cam_key) = node.camera {
                self.cameras.remove(cam_key);
            }
            if let Some(light_key) = node.light {
                self.lights.remove(light_key);
            }
            if let Some(binding) = node.skin {
                self.skins.remove(binding.skeleton);
            }
        }

        self.nodes.remove(handle);
    }

    /// Reparents `child` under `parent`, detaching it from its previous
    /// parent (or the root list) first.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself");
            return;
        }

        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(op) = old_parent {
            if let Some(n) = self.nodes.get_mut(op) {
                if let Some(i) = n.children.iter().position(|&c| c == child) {
                    n.children.remove(i);
                }
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&r| r == child) {
            self.root_nodes.remove(i);
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        } else {
            log::error!("Parent node not found during attach");
            self.root_nodes.push(child);
            return;
        }

        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Depth-first name lookup within the subtree rooted at `root`.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let node = self.nodes.get(root)?;
        if node.name == name {
            return Some(root);
        }
        for &child in &node.children {
            if let Some(found) = self.find_node_by_name(child, name) {
                return Some(found);
            }
        }
        None
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn add_mesh(&mut self, mesh: Mesh) -> NodeHandle {
        let mut node = Node::new(mesh.name.clone());
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_node(node)
    }

    pub fn add_camera(&mut self, camera: Camera) -> NodeHandle {
        let mut node = Node::new("Camera");
        node.camera = Some(self.cameras.insert(camera));
        self.add_node(node)
    }

    pub fn add_light(&mut self, light: Light) -> NodeHandle {
        let mut node = Node::new("Light");
        node.light = Some(self.lights.insert(light));
        self.add_node(node)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skins.insert(skeleton)
    }

    /// The active camera's `(Transform, Camera)` pair.
    pub fn query_active_camera(&mut self) -> Option<(&mut Transform, &mut Camera)> {
        let node_handle = self.active_camera?;
        let camera_key = self.nodes.get(node_handle)?.camera?;
        let camera = self.cameras.get_mut(camera_key)?;
        let transform = &mut self.nodes.get_mut(node_handle)?.transform;
        Some((transform, camera))
    }

    /// Updates the active camera's aspect ratio, ignoring degenerate values.
    pub fn set_camera_aspect(&mut self, aspect: f32) {
        if let Some((_, camera)) = self.query_active_camera() {
            camera.set_aspect(aspect);
        }
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Refreshes world matrices and skeleton joint matrices. Must run once
    /// per frame, after animation and before drawing.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }

    /// Propagates local matrices down the hierarchy.
    pub fn update_matrix_world(&mut self) {
        let roots = self.root_nodes.clone();
        for root in roots {
            self.update_transform_recursive(root, Affine3A::IDENTITY, false);
        }
    }

    fn update_transform_recursive(
        &mut self,
        handle: NodeHandle,
        parent_world: Affine3A,
        parent_changed: bool,
    ) {
        let (world, children, changed) = {
            let Some(node) = self.nodes.get_mut(handle) else {
                return;
            };

            let local_changed = node.transform.update_local_matrix();
            let needs_update = local_changed || parent_changed;
            if needs_update {
                let new_world = parent_world * *node.transform.local_matrix();
                node.transform.set_world_matrix(new_world);
            }

            (
                *node.transform.world_matrix(),
                node.children.clone(),
                needs_update,
            )
        };

        for child in children {
            self.update_transform_recursive(child, world, changed);
        }
    }

    /// Recomputes joint matrices for every bound skeleton.
    pub fn update_skeletons(&mut self) {
        // Collect (skeleton, root inverse) pairs first to keep the borrow
        // of `nodes` immutable while skeletons are mutated.
        let mut tasks = Vec::new();
        for (_, node) in &self.nodes {
            if let Some(binding) = &node.skin {
                let root_inv = node.transform.world_matrix.inverse();
                tasks.push((binding.skeleton, root_inv));
            }
        }

        let nodes = &self.nodes;
        for (skeleton_key, root_inv) in tasks {
            if let Some(skeleton) = self.skins.get_mut(skeleton_key) {
                skeleton.compute_joint_matrices(nodes, root_inv);
            }
        }
    }
}
