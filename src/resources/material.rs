use glam::Vec4;

/// A flat-shaded surface description.
///
/// The forward pass renders solid base colors with hemisphere + directional
/// lighting; `unlit` materials skip lighting entirely (used for debug
/// surfaces and the ground grid).
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    /// Base color (linear RGBA).
    pub color: Vec4,
    pub unlit: bool,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>, color: Vec4) -> Self {
        Self {
            name: name.into(),
            color,
            unlit: false,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", Vec4::new(0.8, 0.8, 0.8, 1.0))
    }
}
