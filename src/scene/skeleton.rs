use glam::{Affine3A, Mat4};
use slotmap::SlotMap;

use crate::scene::node::Node;
use crate::scene::{NodeHandle, SkeletonKey};

/// Attaches a skinned mesh node to a [`Skeleton`].
#[derive(Debug, Clone, Copy)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
}

/// Bone list plus inverse bind matrices for one skin.
///
/// `bones[i]` corresponds to joint index `i` in the mesh's joint attribute.
/// Joint matrices are recomputed each frame after the world-matrix pass and
/// consumed by the CPU skinning path.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    pub bones: Vec<NodeHandle>,
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        bones: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
    ) -> Self {
        let count = bones.len();
        Self {
            name: name.into(),
            bones,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    /// Final joint matrices for the current pose.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Recomputes joint matrices from the current bone world matrices.
    ///
    /// `root_matrix_inv` is the inverse world matrix of the node carrying
    /// the skinned mesh, transforming the pose back into mesh local space.
    pub fn compute_joint_matrices(
        &mut self,
        nodes: &SlotMap<NodeHandle, Node>,
        root_matrix_inv: Affine3A,
    ) {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone_handle) else {
                continue;
            };
            let bone_world = bone_node.transform.world_matrix;
            let ibm = self
                .inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Affine3A::IDENTITY);
            self.joint_matrices[i] = (root_matrix_inv * bone_world * ibm).into();
        }
    }
}
