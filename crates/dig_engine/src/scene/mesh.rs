//! Vertex buffers attached to scene nodes
//!
//! Only positions and triangle indices are kept; normals and texture
//! coordinates belong to the renderer, not to anything the engine core
//! reads back.

use crate::foundation::math::{Vec3, constants};
use super::scene_graph::AABB;

/// Model-space geometry of one renderable sub-mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions in model space
    pub positions: Vec<Vec3>,
    
    /// Triangle list indices into `positions`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create a mesh from raw positions and indices
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }
    
    /// Box centered at the origin with the given half-extents
    ///
    /// 8 vertices, 36 indices (12 triangles).
    pub fn cuboid(half_extents: Vec3) -> Self {
        let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);
        let positions = vec![
            // Front face (z+)
            Vec3::new(-hx, -hy, hz),
            Vec3::new(hx, -hy, hz),
            Vec3::new(hx, hy, hz),
            Vec3::new(-hx, hy, hz),
            // Back face (z-)
            Vec3::new(-hx, -hy, -hz),
            Vec3::new(-hx, hy, -hz),
            Vec3::new(hx, hy, -hz),
            Vec3::new(hx, -hy, -hz),
        ];

        let indices = vec![
            // Front
            0, 1, 2, 2, 3, 0,
            // Back
            4, 5, 6, 6, 7, 4,
            // Left
            4, 0, 3, 3, 5, 4,
            // Right
            1, 7, 6, 6, 2, 1,
            // Top
            3, 2, 6, 6, 5, 3,
            // Bottom
            4, 7, 1, 1, 0, 4,
        ];

        Self::new(positions, indices)
    }
    
    /// Closed cylinder along Y, centered at the origin
    ///
    /// `segments` is clamped to at least 3.
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let mut positions = Vec::with_capacity(segments as usize * 2 + 2);
        
        for y in [-half, half] {
            for i in 0..segments {
                let theta = i as f32 / segments as f32 * constants::TAU;
                positions.push(Vec3::new(radius * theta.cos(), y, radius * theta.sin()));
            }
        }
        let bottom_center = positions.len() as u32;
        positions.push(Vec3::new(0.0, -half, 0.0));
        let top_center = positions.len() as u32;
        positions.push(Vec3::new(0.0, half, 0.0));
        
        let mut indices = Vec::with_capacity(segments as usize * 12);
        for i in 0..segments {
            let j = (i + 1) % segments;
            let (b_i, b_j) = (i, j);
            let (t_i, t_j) = (segments + i, segments + j);
            // Side quad
            indices.extend_from_slice(&[b_i, t_i, t_j, b_i, t_j, b_j]);
            // Caps
            indices.extend_from_slice(&[top_center, t_j, t_i]);
            indices.extend_from_slice(&[bottom_center, b_i, b_j]);
        }
        
        Self::new(positions, indices)
    }
    
    /// Upper hemisphere resting on y = 0
    ///
    /// `rings` counts latitude bands between the equator and the pole.
    pub fn dome(radius: f32, rings: u32, segments: u32) -> Self {
        let rings = rings.max(1);
        let segments = segments.max(3);
        let mut positions = Vec::with_capacity((rings * segments + 1) as usize);
        
        for ring in 0..rings {
            let phi = ring as f32 / rings as f32 * constants::HALF_PI;
            let (ring_radius, y) = (radius * phi.cos(), radius * phi.sin());
            for i in 0..segments {
                let theta = i as f32 / segments as f32 * constants::TAU;
                positions.push(Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin()));
            }
        }
        let pole = positions.len() as u32;
        positions.push(Vec3::new(0.0, radius, 0.0));
        
        let mut indices = Vec::new();
        for ring in 0..rings.saturating_sub(1) {
            let lower = ring * segments;
            let upper = (ring + 1) * segments;
            for i in 0..segments {
                let j = (i + 1) % segments;
                indices.extend_from_slice(&[lower + i, upper + i, upper + j, lower + i, upper + j, lower + j]);
            }
        }
        let last = (rings - 1) * segments;
        for i in 0..segments {
            let j = (i + 1) % segments;
            indices.extend_from_slice(&[pole, last + j, last + i]);
        }
        
        Self::new(positions, indices)
    }
    
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
    
    /// Model-space bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.positions.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_extents() {
        let mesh = MeshData::cuboid(Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.indices.len(), 36);
        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.min, Vec3::new(-1.0, -0.5, -2.0));
        assert_relative_eq!(bounds.max, Vec3::new(1.0, 0.5, 2.0));
    }

    #[test]
    fn test_cylinder_indices_in_range() {
        let mesh = MeshData::cylinder(3.0, 1.5, 16);
        assert_eq!(mesh.vertex_count(), 34);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.max.y, 0.75);
        assert_relative_eq!(bounds.max.x, 3.0);
    }

    #[test]
    fn test_dome_rests_on_ground() {
        let mesh = MeshData::dome(2.0, 4, 12);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.min.y, 0.0);
        assert_relative_eq!(bounds.max.y, 2.0);
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(MeshData::default().bounds().is_none());
    }
}
