use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use crate::animation::AnimationClip;
use crate::resources::Mesh;
use crate::scene::{Node, NodeHandle, Scene, Skeleton, SkinBinding};

/// A decoded node, referencing siblings by index into the prefab arrays.
#[derive(Debug, Clone)]
pub struct PrefabNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub children: Vec<usize>,
    /// Indices into [`ModelPrefab::meshes`]. Multiple entries (one per
    /// primitive) become unnamed child nodes at instantiation.
    pub meshes: Vec<usize>,
    /// Index into [`ModelPrefab::skins`].
    pub skin: Option<usize>,
    pub morph_weights: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct PrefabSkeleton {
    pub name: String,
    /// Joint node indices, in glTF joint order.
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

/// Scene-independent decode result: a node tree, its meshes and skins, and
/// the animation clips that target it. Produced on a loader thread, turned
/// into live scene nodes on the main thread by [`instantiate`](Self::instantiate).
#[derive(Debug, Clone)]
pub struct ModelPrefab {
    pub name: String,
    pub nodes: Vec<PrefabNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub skins: Vec<PrefabSkeleton>,
    pub clips: Vec<Arc<AnimationClip>>,
}

impl ModelPrefab {
    /// Builds the node hierarchy inside `scene` under a fresh root node
    /// named after the prefab, and returns that root's handle. The root is
    /// the single teardown point: removing it removes the whole instance.
    pub fn instantiate(&self, scene: &mut Scene) -> NodeHandle {
        let root = scene.add_node(Node::new(self.name.clone()));

        // Pass 1: create every node so handles exist for skeleton joints.
        let handles: Vec<NodeHandle> = self
            .nodes
            .iter()
            .map(|prefab_node| {
                let mut node = Node::new(prefab_node.name.clone());
                node.transform.position = prefab_node.translation;
                node.transform.rotation = prefab_node.rotation;
                node.transform.scale = prefab_node.scale;
                node.morph_weights = prefab_node.morph_weights.clone();
                scene.add_node(node)
            })
            .collect();

        // Pass 2: hierarchy.
        for (index, prefab_node) in self.nodes.iter().enumerate() {
            for &child in &prefab_node.children {
                scene.attach(handles[child], handles[index]);
            }
        }
        for &root_index in &self.roots {
            scene.attach(handles[root_index], root);
        }

        // Pass 3: skeletons, now that joint handles are known.
        let skeleton_keys: Vec<_> = self
            .skins
            .iter()
            .map(|skin| {
                let bones = skin.joints.iter().map(|&j| handles[j]).collect();
                scene.add_skeleton(Skeleton::new(
                    skin.name.clone(),
                    bones,
                    skin.inverse_bind_matrices.clone(),
                ))
            })
            .collect();

        // Pass 4: meshes and skin bindings.
        for (index, prefab_node) in self.nodes.iter().enumerate() {
            let skin = prefab_node
                .skin
                .map(|s| SkinBinding {
                    skeleton: skeleton_keys[s],
                });
            if let Some(node) = scene.get_node_mut(handles[index]) {
                node.skin = skin;
            }

            match prefab_node.meshes.as_slice() {
                [] => {}
                [single] => {
                    let mesh = self.meshes[*single].clone();
                    if prefab_node.morph_weights.is_empty() && !mesh.geometry.morph_targets.is_empty() {
                        if let Some(node) = scene.get_node_mut(handles[index]) {
                            node.morph_weights = vec![0.0; mesh.geometry.morph_targets.len()];
                        }
                    }
                    let key = scene.meshes.insert(mesh);
                    if let Some(node) = scene.get_node_mut(handles[index]) {
                        node.mesh = Some(key);
                    }
                }
                many => {
                    // One child per primitive; the parent keeps the name so
                    // animation tracks still find it.
                    for &mesh_index in many {
                        let mesh = self.meshes[mesh_index].clone();
                        let morph_count = mesh.geometry.morph_targets.len();
                        let mut child = Node::new(format!("{}_{mesh_index}", prefab_node.name));
                        child.skin = skin;
                        if morph_count > 0 {
                            child.morph_weights = vec![0.0; morph_count];
                        }
                        child.mesh = Some(scene.meshes.insert(mesh));
                        scene.add_to_parent(child, handles[index]);
                    }
                }
            }
        }

        root
    }
}
