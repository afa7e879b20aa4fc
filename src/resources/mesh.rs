use std::sync::Arc;

use crate::resources::geometry::Geometry;
use crate::resources::material::Material;

/// A drawable: shared geometry plus a material.
///
/// Geometry is reference-counted so instantiating the same prefab twice
/// (or splitting a multi-primitive mesh across nodes) does not duplicate
/// vertex data.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: Material,
    /// Whether this mesh is drawn into the shadow map. Large receivers
    /// like the ground plane turn this off.
    pub cast_shadows: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            cast_shadows: true,
        }
    }
}
