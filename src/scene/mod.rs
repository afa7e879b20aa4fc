//! Scene graph: nodes, transforms, cameras, lights, and skeletons.

pub mod camera;
pub mod light;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod stage;
pub mod transform;

pub use camera::Camera;
pub use light::{Light, LightKind};
pub use node::Node;
pub use scene::{Fog, Scene};
pub use skeleton::{Skeleton, SkinBinding};
pub use stage::{Stage, StageSettings, build_stage};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a [`Node`] in a [`Scene`].
    pub struct NodeHandle;
    /// Handle to a [`crate::resources::Mesh`] component.
    pub struct MeshKey;
    /// Handle to a [`Camera`] component.
    pub struct CameraKey;
    /// Handle to a [`Light`] component.
    pub struct LightKey;
    /// Handle to a [`Skeleton`].
    pub struct SkeletonKey;
}
