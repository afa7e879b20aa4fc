use std::sync::Arc;

use glam::Vec3;

use crate::resources::mesh::Mesh;
use crate::resources::primitives;
use crate::resources::Material;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::scene::{Fog, Scene};
use crate::scene::NodeHandle;

fn srgb_u8(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Parameters for [`build_stage`]. The defaults produce the classic
/// character-viewer setup: grey backdrop with matching fog, a large ground
/// plane, hemisphere fill plus a directional key light, and a perspective
/// camera aimed at chest height.
#[derive(Debug, Clone)]
pub struct StageSettings {
    pub background: Vec3,
    pub fog: Option<Fog>,

    pub camera_fov_degrees: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_position: Vec3,
    pub camera_target: Vec3,

    pub ground_size: f32,
    pub ground_color: Vec3,

    pub grid_divisions: u32,
    pub grid_color: Vec3,
    pub grid_opacity: f32,

    pub hemisphere_sky: Vec3,
    pub hemisphere_ground: Vec3,
    pub hemisphere_intensity: f32,

    pub directional_color: Vec3,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    pub directional_casts_shadows: bool,
}

impl Default for StageSettings {
    fn default() -> Self {
        let backdrop = srgb_u8(0xa0a0a0);
        Self {
            background: backdrop,
            fog: Some(Fog {
                color: backdrop,
                near: 200.0,
                far: 1000.0,
            }),
            camera_fov_degrees: 45.0,
            camera_near: 1.0,
            camera_far: 2000.0,
            camera_position: Vec3::new(100.0, 200.0, 300.0),
            camera_target: Vec3::new(0.0, 100.0, 0.0),
            ground_size: 2000.0,
            ground_color: srgb_u8(0x999999),
            grid_divisions: 20,
            grid_color: srgb_u8(0x000000),
            grid_opacity: 0.2,
            hemisphere_sky: Vec3::ONE,
            hemisphere_ground: srgb_u8(0x444444),
            hemisphere_intensity: 1.0,
            directional_color: Vec3::ONE,
            directional_intensity: 1.0,
            directional_position: Vec3::new(0.0, 200.0, 100.0),
            directional_casts_shadows: true,
        }
    }
}

/// Handles to the fixed environment nodes created by [`build_stage`].
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub camera: NodeHandle,
    pub ground: NodeHandle,
    pub grid: NodeHandle,
    pub hemisphere: NodeHandle,
    pub directional: NodeHandle,
}

/// Populates `scene` with the standard viewer environment and returns
/// handles to the created nodes. The camera becomes the scene's active
/// camera. Aspect ratio starts at 1.0; callers fix it up on the first
/// resize.
pub fn build_stage(scene: &mut Scene, settings: &StageSettings) -> Stage {
    scene.background = settings.background.extend(1.0);
    scene.fog = settings.fog;

    let camera = scene.add_camera(Camera::new_perspective(
        settings.camera_fov_degrees,
        1.0,
        settings.camera_near,
        settings.camera_far,
    ));
    if let Some(node) = scene.get_node_mut(camera) {
        node.transform.position = settings.camera_position;
        node.transform.look_at(settings.camera_target, Vec3::Y);
    }
    scene.active_camera = Some(camera);

    let ground_geometry = Arc::new(primitives::plane(settings.ground_size, settings.ground_size));
    let mut ground_mesh = Mesh::new(
        "Ground",
        ground_geometry,
        Material {
            name: "Ground".into(),
            color: settings.ground_color.extend(1.0),
            unlit: false,
        },
    );
    ground_mesh.cast_shadows = false;
    let ground = scene.add_mesh(ground_mesh);

    // Added after the ground so it draws on top of the coplanar plane.
    let grid_geometry = Arc::new(primitives::grid(
        settings.ground_size,
        settings.grid_divisions,
    ));
    let mut grid_mesh = Mesh::new(
        "Grid",
        grid_geometry,
        Material {
            name: "Grid".into(),
            color: settings.grid_color.extend(settings.grid_opacity),
            unlit: true,
        },
    );
    grid_mesh.cast_shadows = false;
    let grid = scene.add_mesh(grid_mesh);

    let hemisphere = scene.add_light(Light::new_hemisphere(
        settings.hemisphere_sky,
        settings.hemisphere_ground,
        settings.hemisphere_intensity,
    ));
    if let Some(node) = scene.get_node_mut(hemisphere) {
        node.name = "Hemisphere".into();
        node.transform.position = Vec3::new(0.0, 200.0, 0.0);
    }

    let mut key = Light::new_directional(settings.directional_color, settings.directional_intensity);
    key.cast_shadows = settings.directional_casts_shadows;
    let directional = scene.add_light(key);
    if let Some(node) = scene.get_node_mut(directional) {
        node.name = "KeyLight".into();
        node.transform.position = settings.directional_position;
        node.transform.look_at(Vec3::ZERO, Vec3::Y);
    }

    Stage {
        camera,
        ground,
        grid,
        hemisphere,
        directional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_populates_scene() {
        let mut scene = Scene::new();
        let stage = build_stage(&mut scene, &StageSettings::default());

        assert_eq!(scene.active_camera, Some(stage.camera));
        assert_eq!(scene.cameras.len(), 1);
        assert_eq!(scene.lights.len(), 2);
        assert_eq!(scene.meshes.len(), 2);

        let fog = scene.fog.expect("default stage has fog");
        assert!(fog.near < fog.far);

        let ground = scene.get_node(stage.ground).unwrap();
        assert!(ground.mesh.is_some());
    }

    #[test]
    fn stage_grid_is_translucent_lines_over_the_ground() {
        use crate::resources::Topology;

        let mut scene = Scene::new();
        let stage = build_stage(&mut scene, &StageSettings::default());

        let node = scene.get_node(stage.grid).unwrap();
        let mesh = scene.meshes.get(node.mesh.unwrap()).unwrap();
        assert_eq!(mesh.geometry.topology, Topology::LineList);
        assert!(mesh.material.unlit);
        assert!(mesh.material.color.w < 1.0);
        assert!(!mesh.cast_shadows);

        // Neither environment plane throws a shadow onto itself.
        let ground_node = scene.get_node(stage.ground).unwrap();
        let ground = scene.meshes.get(ground_node.mesh.unwrap()).unwrap();
        assert!(!ground.cast_shadows);
    }

    #[test]
    fn camera_looks_at_target() {
        let mut scene = Scene::new();
        let stage = build_stage(&mut scene, &StageSettings::default());
        scene.update();

        let node = scene.get_node(stage.camera).unwrap();
        let world = node.transform.world_matrix();
        // Forward (-Z) must point from the camera towards the target.
        let forward = -world.matrix3.z_axis;
        let expected =
            (Vec3::new(0.0, 100.0, 0.0) - Vec3::new(100.0, 200.0, 300.0)).normalize();
        assert!(Vec3::from(forward).dot(expected) > 0.999);
    }
}
