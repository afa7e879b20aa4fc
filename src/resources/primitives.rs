//! Built-in geometry primitives.

use glam::Vec3;

use crate::resources::geometry::{Geometry, Topology};

/// A flat plane in the XZ plane, centered at the origin, facing +Y.
#[must_use]
pub fn plane(width: f32, depth: f32) -> Geometry {
    let hw = width * 0.5;
    let hd = depth * 0.5;

    let positions = vec![
        Vec3::new(-hw, 0.0, -hd),
        Vec3::new(-hw, 0.0, hd),
        Vec3::new(hw, 0.0, hd),
        Vec3::new(hw, 0.0, -hd),
    ];
    let normals = vec![Vec3::Y; 4];

    let mut geometry = Geometry::new("plane", positions, normals);
    geometry.indices = Some(vec![0, 1, 2, 0, 2, 3]);
    geometry
}

/// A square line grid in the XZ plane, centered at the origin. Vertex
/// pairs form a `LineList`: `divisions + 1` lines along each axis.
#[must_use]
pub fn grid(size: f32, divisions: u32) -> Geometry {
    let half = size * 0.5;
    let step = size / divisions.max(1) as f32;

    let mut positions = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let offset = -half + i as f32 * step;
        positions.push(Vec3::new(-half, 0.0, offset));
        positions.push(Vec3::new(half, 0.0, offset));
        positions.push(Vec3::new(offset, 0.0, -half));
        positions.push(Vec3::new(offset, 0.0, half));
    }

    let count = positions.len();
    let mut geometry = Geometry::new("grid", positions, vec![Vec3::Y; count]);
    geometry.topology = Topology::LineList;
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_has_four_vertices_two_triangles() {
        let geometry = plane(2000.0, 2000.0);
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.indices.as_ref().map(Vec::len), Some(6));
        assert!(!geometry.is_dynamic());
    }

    #[test]
    fn plane_faces_up() {
        let geometry = plane(10.0, 10.0);
        assert!(geometry.normals.iter().all(|n| *n == Vec3::Y));
        assert!(geometry.positions.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn grid_is_a_line_list_spanning_the_size() {
        let geometry = grid(2000.0, 20);
        assert_eq!(geometry.topology, Topology::LineList);
        // 21 lines per axis, two vertices each.
        assert_eq!(geometry.vertex_count(), 21 * 2 * 2);
        assert!(geometry
            .positions
            .iter()
            .all(|p| p.x.abs() <= 1000.0 && p.z.abs() <= 1000.0 && p.y == 0.0));
    }
}
