//! Mesh-to-hull projection
//!
//! The collision code reads geometry through [`MeshSource`] and moves the
//! vehicle through [`MovableSource`]; any scene representation that can
//! hand out world-space vertices can drive it.

use crate::foundation::math::{Point2, Vec3};
use super::hull::convex_hull;

/// Read access to world-space mesh geometry
pub trait MeshSource {
    /// Opaque node handle
    type Node: Copy + std::fmt::Debug;

    /// World-space positions of every vertex of every renderable sub-mesh
    /// under `node`, with all ancestor transforms applied as of now
    ///
    /// `None` when the handle does not refer to a live node. A live node
    /// without geometry yields an empty vector.
    fn world_vertices(&self, node: Self::Node) -> Option<Vec<Vec3>>;

    /// Name used in diagnostics
    fn node_label(&self, node: Self::Node) -> String {
        format!("{node:?}")
    }

    /// Check whether the handle refers to a live node
    fn contains_node(&self, node: Self::Node) -> bool {
        self.world_vertices(node).is_some()
    }
}

/// A [`MeshSource`] whose nodes can be moved
pub trait MovableSource: MeshSource {
    /// Offset the node's position by `delta`; false if the node is gone
    fn translate_node(&mut self, node: Self::Node, delta: Vec3) -> bool;
}

/// Project a node's geometry onto the XZ plane and hull it
///
/// With `min_y` set, vertices below that height are dropped first (used to
/// keep below-ground mesh artifacts out of obstacle silhouettes). The
/// result is empty whenever fewer than 3 hull points remain, including for
/// a missing node, so callers only need a length check.
pub fn project_to_hull<S: MeshSource + ?Sized>(
    source: &S,
    node: S::Node,
    min_y: Option<f32>,
) -> Vec<Point2> {
    let Some(vertices) = source.world_vertices(node) else {
        log::debug!("project_to_hull: {} is not in the scene", source.node_label(node));
        return Vec::new();
    };

    let points: Vec<Point2> = vertices
        .iter()
        .filter(|v| min_y.map_or(true, |min| v.y >= min))
        .map(|v| Point2::new(v.x, v.z))
        .collect();

    if points.len() < 3 {
        log::debug!(
            "project_to_hull: {} has only {} usable vertices",
            source.node_label(node),
            points.len()
        );
        return Vec::new();
    }

    let hull = convex_hull(points);
    if hull.len() < 3 {
        log::debug!(
            "project_to_hull: {} footprint is degenerate ({} hull points)",
            source.node_label(node),
            hull.len()
        );
        return Vec::new();
    }
    hull
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Bare vertex lists keyed by id; stands in for a renderer's scene
    #[derive(Default)]
    struct PointCloud {
        clouds: HashMap<u32, Vec<Vec3>>,
    }

    impl MeshSource for PointCloud {
        type Node = u32;

        fn world_vertices(&self, node: u32) -> Option<Vec<Vec3>> {
            self.clouds.get(&node).cloned()
        }
    }

    #[test]
    fn test_projects_xz_and_hulls() {
        let mut source = PointCloud::default();
        source.clouds.insert(1, vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 5.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 2.0, 1.0),
            Vec3::new(0.0, 9.0, 0.0),
        ]);
        let hull = project_to_hull(&source, 1, None);
        assert_eq!(hull, vec![
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 1.0),
        ]);
    }

    #[test]
    fn test_min_y_filters_buried_vertices() {
        let mut source = PointCloud::default();
        source.clouds.insert(1, vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            // Buried spike that would widen the footprint
            Vec3::new(10.0, -3.0, 10.0),
        ]);
        assert_eq!(project_to_hull(&source, 1, None).len(), 4);
        assert_eq!(project_to_hull(&source, 1, Some(-0.1)).len(), 3);
    }

    #[test]
    fn test_missing_or_thin_geometry_yields_nothing() {
        let mut source = PointCloud::default();
        source.clouds.insert(1, vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]);
        // Vertical plank: distinct 3D points, one XZ segment
        source.clouds.insert(2, vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]);
        source.clouds.insert(3, Vec::new());

        assert!(project_to_hull(&source, 1, None).is_empty());
        assert!(project_to_hull(&source, 2, None).is_empty());
        assert!(project_to_hull(&source, 3, None).is_empty());
        assert!(project_to_hull(&source, 99, None).is_empty());
    }
}
