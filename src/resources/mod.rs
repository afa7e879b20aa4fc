//! CPU-side renderable resources: geometry, materials, and meshes.

pub mod geometry;
pub mod material;
pub mod mesh;
pub mod primitives;

pub use geometry::{Geometry, MorphTarget, Topology, MAX_MORPH_TARGETS};
pub use material::Material;
pub use mesh::Mesh;
