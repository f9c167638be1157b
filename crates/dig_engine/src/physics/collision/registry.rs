//! Obstacle hulls and pass-through zones
//!
//! The registry is an ordinary value owned by whoever builds the world and
//! lent to the resolver and the debug overlay. Obstacle order only matters
//! for [`ColliderRegistry::update_last_obstacle`] and
//! [`ColliderRegistry::remove_last_obstacle`], which track the most recent
//! registration (the dig pile, in practice).
//!
//! Hull data is copied out of the scene at registration time; the scene
//! node may be moved or destroyed afterwards without affecting it.

use crate::foundation::math::{Point2, Vec2};
use super::extraction::{project_to_hull, MeshSource};
use super::hull::convex_hull;
use super::primitives::{edge_outward_normal, NoCollisionZone};

/// Height of the ground plane
pub const GROUND_LEVEL: f32 = 0.0;

/// Static convex footprint of one obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct MeshXZCollider {
    /// Counterclockwise hull on the XZ plane, without a repeated closing point
    pub hull: Vec<Point2>,
}

impl MeshXZCollider {
    /// Wrap an already-built counterclockwise hull
    pub fn new(hull: Vec<Point2>) -> Self {
        Self { hull }
    }

    /// Hulls with fewer than 3 points take no part in collision checks
    pub fn is_valid(&self) -> bool {
        self.hull.len() >= 3
    }

    /// Polygon edges `(a, b)` in order, wrapping from last to first
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.hull.len();
        (0..n).map(move |i| (self.hull[i], self.hull[(i + 1) % n]))
    }

    /// Edges paired with their unit outward normal, degenerate edges skipped
    pub fn edge_normals(&self) -> impl Iterator<Item = (Point2, Vec2)> + '_ {
        self.edges()
            .filter_map(|(a, b)| edge_outward_normal(a, b).map(|n| (a, n)))
    }
}

/// Registered obstacles and pass-through zones
#[derive(Debug, Clone, Default)]
pub struct ColliderRegistry {
    obstacles: Vec<MeshXZCollider>,
    zones: Vec<NoCollisionZone>,
}

impl ColliderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Height of the ground plane, for joint limits that keep the bucket
    /// above it
    pub fn ground_level() -> f32 {
        GROUND_LEVEL
    }

    /// Register the footprint of `node` as an obstacle
    ///
    /// Silently skipped (returns false) when the node yields fewer than 3
    /// hull points.
    pub fn add_obstacle<S: MeshSource + ?Sized>(&mut self, source: &S, node: S::Node) -> bool {
        self.add_projected(source, node, None)
    }

    /// Like [`add_obstacle`](Self::add_obstacle) but ignoring vertices
    /// below `min_y`
    pub fn add_obstacle_filtered<S: MeshSource + ?Sized>(
        &mut self,
        source: &S,
        node: S::Node,
        min_y: f32,
    ) -> bool {
        self.add_projected(source, node, Some(min_y))
    }

    fn add_projected<S: MeshSource + ?Sized>(
        &mut self,
        source: &S,
        node: S::Node,
        min_y: Option<f32>,
    ) -> bool {
        let hull = project_to_hull(source, node, min_y);
        if hull.len() < 3 {
            log::debug!("add_obstacle: skipping {}, no usable footprint", source.node_label(node));
            return false;
        }
        log::trace!(
            "add_obstacle: {} -> collider #{} ({} hull points)",
            source.node_label(node),
            self.obstacles.len(),
            hull.len()
        );
        self.obstacles.push(MeshXZCollider::new(hull));
        true
    }

    /// Register a prebuilt footprint
    ///
    /// The points go through [`convex_hull`] first, so winding, order and
    /// duplicates do not matter.
    pub fn add_hull(&mut self, points: Vec<Point2>) -> bool {
        let hull = convex_hull(points);
        if hull.len() < 3 {
            log::debug!("add_hull: skipping hull with {} points", hull.len());
            return false;
        }
        self.obstacles.push(MeshXZCollider::new(hull));
        true
    }

    /// Recompute the most recent obstacle's hull from `node`
    ///
    /// No-op (returns false) when the registry is empty or the node no
    /// longer yields a usable hull; the old hull is kept in that case.
    pub fn update_last_obstacle<S: MeshSource + ?Sized>(&mut self, source: &S, node: S::Node) -> bool {
        let Some(last) = self.obstacles.last_mut() else {
            log::trace!("update_last_obstacle: registry is empty");
            return false;
        };
        let hull = project_to_hull(source, node, None);
        if hull.len() < 3 {
            log::debug!(
                "update_last_obstacle: {} has no usable footprint, keeping previous hull",
                source.node_label(node)
            );
            return false;
        }
        last.hull = hull;
        true
    }

    /// Drop the most recent obstacle; no-op on an empty registry
    pub fn remove_last_obstacle(&mut self) -> Option<MeshXZCollider> {
        let removed = self.obstacles.pop();
        if removed.is_some() {
            log::trace!("remove_last_obstacle: {} left", self.obstacles.len());
        }
        removed
    }

    /// Drop every obstacle
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Register a pass-through zone
    pub fn add_zone(&mut self, zone: NoCollisionZone) {
        log::trace!(
            "add_zone: center=({:.2}, {:.2}) half=({:.2}, {:.2}) yaw={:.3}",
            zone.center.x, zone.center.y, zone.half_width, zone.half_depth, zone.yaw
        );
        self.zones.push(zone);
    }

    /// Drop every pass-through zone
    pub fn clear_zones(&mut self) {
        self.zones.clear();
    }

    /// Drop obstacles and zones (environment regeneration)
    pub fn clear_all(&mut self) {
        self.clear_obstacles();
        self.clear_zones();
    }

    /// Registered obstacles in insertion order
    pub fn obstacles(&self) -> &[MeshXZCollider] {
        &self.obstacles
    }

    /// Registered pass-through zones in insertion order
    pub fn zones(&self) -> &[NoCollisionZone] {
        &self.zones
    }

    /// Number of registered obstacles
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Number of registered zones
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// True when `(x, z)`, with both zone extents grown by `expand`, is
    /// inside any pass-through zone
    pub fn in_pass_through_zone(&self, x: f32, z: f32, expand: f32) -> bool {
        self.zones.iter().any(|zone| zone.contains_expanded(x, z, expand, expand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};
    use crate::scene::{MeshData, SceneGraph};

    fn boulder(scene: &mut SceneGraph, x: f32, z: f32, half: f32) -> crate::scene::NodeKey {
        scene.add_node(
            "boulder",
            Transform::from_position(Vec3::new(x, 0.0, z)),
            Some(MeshData::cuboid(Vec3::new(half, half, half))),
        )
    }

    #[test]
    fn test_ground_level_is_zero() {
        assert_eq!(ColliderRegistry::ground_level(), 0.0);
    }

    #[test]
    fn test_add_and_update_last() {
        let mut scene = SceneGraph::new();
        let mut registry = ColliderRegistry::new();
        let a = boulder(&mut scene, 0.0, 0.0, 1.0);
        let pile = boulder(&mut scene, 10.0, 0.0, 2.0);

        assert!(registry.add_obstacle(&scene, a));
        assert!(registry.add_obstacle(&scene, pile));
        assert_eq!(registry.obstacle_count(), 2);
        let first = registry.obstacles()[0].clone();

        // Pile shrinks after a scoop
        scene.set_scale(pile, Vec3::new(0.5, 0.5, 0.5));
        assert!(registry.update_last_obstacle(&scene, pile));
        assert_eq!(registry.obstacle_count(), 2);
        assert_eq!(registry.obstacles()[0], first);
        let max_x = registry.obstacles()[1].hull.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!((max_x - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_hull_survives_node_removal() {
        let mut scene = SceneGraph::new();
        let mut registry = ColliderRegistry::new();
        let rock = boulder(&mut scene, 3.0, 3.0, 1.0);
        registry.add_obstacle(&scene, rock);
        scene.remove(rock);

        assert_eq!(registry.obstacle_count(), 1);
        assert!(registry.obstacles()[0].is_valid());
        // Updating from the dead node keeps the old hull
        assert!(!registry.update_last_obstacle(&scene, rock));
        assert_eq!(registry.obstacles()[0].hull.len(), 4);
    }

    #[test]
    fn test_degenerate_nodes_skipped() {
        let mut scene = SceneGraph::new();
        let mut registry = ColliderRegistry::new();
        let empty = scene.add_node("group", Transform::identity(), None);
        let line = scene.add_node(
            "wire",
            Transform::identity(),
            Some(MeshData::new(vec![Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)], vec![])),
        );

        assert!(!registry.add_obstacle(&scene, empty));
        assert!(!registry.add_obstacle(&scene, line));
        assert_eq!(registry.obstacle_count(), 0);
        assert!(!registry.add_hull(vec![Point2::origin(), Point2::new(1.0, 0.0)]));
    }

    #[test]
    fn test_empty_registry_operations_are_no_ops() {
        let scene = SceneGraph::new();
        let mut registry = ColliderRegistry::new();
        assert!(registry.remove_last_obstacle().is_none());
        assert_eq!(registry.obstacle_count(), 0);
        let mut other = SceneGraph::new();
        let node = other.add_node("n", Transform::identity(), Some(MeshData::cuboid(Vec3::new(1.0, 1.0, 1.0))));
        assert!(!registry.update_last_obstacle(&scene, node));
    }

    #[test]
    fn test_remove_last_and_clear() {
        let mut registry = ColliderRegistry::new();
        let square = vec![
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 1.0),
        ];
        registry.add_hull(square.clone());
        registry.add_hull(square.iter().map(|p| Point2::new(p.x + 5.0, p.y)).collect());
        registry.add_zone(NoCollisionZone::new(0.0, 0.0, 1.0, 1.0, 0.0));

        let removed = registry.remove_last_obstacle().unwrap();
        assert_eq!(removed.hull[0], Point2::new(4.0, -1.0));
        assert_eq!(registry.obstacles()[0].hull, square);

        registry.clear_obstacles();
        assert_eq!(registry.obstacle_count(), 0);
        assert_eq!(registry.zone_count(), 1);

        registry.add_hull(square);
        registry.clear_all();
        assert_eq!(registry.obstacle_count(), 0);
        assert_eq!(registry.zone_count(), 0);
    }

    #[test]
    fn test_filtered_registration() {
        let mut scene = SceneGraph::new();
        let mut registry = ColliderRegistry::new();
        // Rock sunk halfway into the ground, with a wide buried base
        let rock = scene.add_node("rock", Transform::identity(), None);
        scene.add_child(rock, "top", Transform::identity(), Some(MeshData::cuboid(Vec3::new(1.0, 1.0, 1.0))));
        scene.add_child(
            rock,
            "buried",
            Transform::from_position(Vec3::new(0.0, -3.0, 0.0)),
            Some(MeshData::cuboid(Vec3::new(4.0, 0.5, 4.0))),
        );

        assert!(registry.add_obstacle_filtered(&scene, rock, -0.1));
        let max_x = registry.obstacles()[0].hull.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!((max_x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_edge_normals_skip_degenerate() {
        let collider = MeshXZCollider::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]);
        assert_eq!(collider.edges().count(), 4);
        assert_eq!(collider.edge_normals().count(), 3);
    }

    #[test]
    fn test_add_hull_normalizes_winding() {
        let mut registry = ColliderRegistry::new();
        let clockwise = vec![
            Point2::new(-1.0, -1.0),
            Point2::new(-1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(0.0, 0.0),
        ];
        assert!(registry.add_hull(clockwise));

        let hull = &registry.obstacles()[0].hull;
        assert_eq!(
            hull,
            &vec![
                Point2::new(-1.0, -1.0),
                Point2::new(1.0, -1.0),
                Point2::new(1.0, 1.0),
                Point2::new(-1.0, 1.0),
            ]
        );

        // Collinear points collapse below three vertices
        let line = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        assert!(!registry.add_hull(line));
        assert_eq!(registry.obstacle_count(), 1);
    }
}
