//! Render Math Tests
//!
//! Tests for:
//! - Sun view-projection used by the shadow pass
//! - Frustum coverage of the stage around the origin
//! - Degenerate light directions (straight down)

use glam::{Mat4, Vec3, Vec4Swizzles};

use marionette::render::{sun_view_proj, SHADOW_FRUSTUM_EXTENT};

const EPSILON: f32 = 1e-4;

fn project(vp: Mat4, point: Vec3) -> Vec3 {
    let clip = vp * point.extend(1.0);
    clip.xyz() / clip.w
}

#[test]
fn origin_projects_to_the_center_of_the_map() {
    let vp = sun_view_proj(Vec3::new(0.0, -2.0, -1.0));
    let ndc = project(vp, Vec3::ZERO);
    assert!(ndc.x.abs() < EPSILON);
    assert!(ndc.y.abs() < EPSILON);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn frustum_covers_a_character_standing_on_the_ground() {
    let vp = sun_view_proj(Vec3::new(0.0, -200.0, -100.0).normalize());
    for point in [
        Vec3::ZERO,
        Vec3::new(0.0, 180.0, 0.0),
        Vec3::new(100.0, 0.0, 100.0),
        Vec3::new(-100.0, 90.0, -100.0),
    ] {
        let ndc = project(vp, point);
        assert!(ndc.x.abs() <= 1.0, "{point} outside horizontally");
        assert!(ndc.y.abs() <= 1.0, "{point} outside vertically");
        assert!((0.0..=1.0).contains(&ndc.z), "{point} outside depth range");
    }
}

#[test]
fn points_beyond_the_extent_fall_outside() {
    let vp = sun_view_proj(Vec3::NEG_Y + Vec3::Z * 0.5);
    let ndc = project(vp, Vec3::X * (SHADOW_FRUSTUM_EXTENT * 4.0));
    assert!(ndc.x.abs() > 1.0);
}

#[test]
fn straight_down_light_is_not_degenerate() {
    // Light parallel to the default up axis must still produce a usable
    // basis instead of a NaN view matrix.
    let vp = sun_view_proj(Vec3::NEG_Y);
    let ndc = project(vp, Vec3::new(50.0, 0.0, 50.0));
    assert!(ndc.is_finite());
    assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
}

#[test]
fn depth_increases_away_from_the_sun() {
    let vp = sun_view_proj(Vec3::NEG_Y);
    let high = project(vp, Vec3::new(0.0, 100.0, 0.0));
    let low = project(vp, Vec3::ZERO);
    assert!(high.z < low.z, "closer to the sun must be nearer in depth");
}
