use glam::{Affine3A, Mat4};

/// Perspective camera component.
///
/// The camera's pose lives on its owning node; this component only carries
/// projection parameters. The view matrix is the inverse of the node's
/// world matrix.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view, in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    /// Updates the aspect ratio. Non-finite or non-positive values are
    /// rejected so a degenerate resize can never poison the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Projection matrix (wgpu's 0..1 NDC depth range).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// View matrix from the owning node's world matrix.
    #[must_use]
    pub fn view_matrix(world_matrix: &Affine3A) -> Mat4 {
        Mat4::from(*world_matrix).inverse()
    }
}
