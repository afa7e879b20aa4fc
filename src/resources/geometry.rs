use glam::{Vec3, Vec4};

/// Upper bound on morph targets a single mesh may carry. Targets beyond
/// this limit are dropped at decode time with a warning.
pub const MAX_MORPH_TARGETS: usize = 8;

/// How a geometry's vertex stream is assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    #[default]
    TriangleList,
    LineList,
}

/// Per-target displacement data for morph (blend shape) animation.
///
/// Deltas are added to the base attributes, weighted by the owning node's
/// morph weights.
#[derive(Debug, Clone, Default)]
pub struct MorphTarget {
    pub position_deltas: Vec<Vec3>,
    pub normal_deltas: Vec<Vec3>,
}

/// CPU-side vertex data for a single drawable surface.
///
/// Geometry is immutable after decode; skinning and morphing read from it
/// into per-frame scratch buffers without mutating the bind pose.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub name: String,

    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
    pub topology: Topology,

    // Skinning attributes (present only for skinned meshes)
    pub joints: Option<Vec<[u16; 4]>>,
    pub weights: Option<Vec<Vec4>>,

    pub morph_targets: Vec<MorphTarget>,
}

impl Geometry {
    #[must_use]
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, normals: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals,
            indices: None,
            topology: Topology::TriangleList,
            joints: None,
            weights: None,
            morph_targets: Vec::new(),
        }
    }

    /// Number of vertices in the base attribute streams.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// True when both joint indices and weights are present.
    #[inline]
    #[must_use]
    pub fn has_skin(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }

    #[inline]
    #[must_use]
    pub fn has_morph_targets(&self) -> bool {
        !self.morph_targets.is_empty()
    }

    /// True when vertices must be recomputed every frame (skinned or morphed).
    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.has_skin() || self.has_morph_targets()
    }
}
