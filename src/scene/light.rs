use glam::Vec3;

/// Light component variants.
///
/// Directional and point lights use the owning node's pose for direction
/// and position. A hemisphere light is a positionless ambient gradient
/// between a sky color (the light's `color`) and a ground color.
#[derive(Debug, Clone)]
pub enum LightKind {
    Directional,
    Point { range: f32 },
    Hemisphere { ground_color: Vec3 },
}

#[derive(Debug, Clone)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
    pub cast_shadows: bool,
}

impl Light {
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional,
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point { range },
            cast_shadows: false,
        }
    }

    /// Sky/ground gradient light. `color` is the sky color.
    #[must_use]
    pub fn new_hemisphere(sky_color: Vec3, ground_color: Vec3, intensity: f32) -> Self {
        Self {
            color: sky_color,
            intensity,
            kind: LightKind::Hemisphere { ground_color },
            cast_shadows: false,
        }
    }
}
