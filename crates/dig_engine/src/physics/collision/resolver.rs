//! Penetration resolution against the registered obstacle hulls
//!
//! Two entry points share the registry:
//!
//! - [`CollisionResolver::resolve_circle`] keeps a circular proxy outside
//!   every hull.
//! - [`CollisionResolver::resolve_vehicle`] hulls the vehicle's chassis
//!   parts and pushes the vehicle root out of every obstacle they overlap.
//!
//! # Known approximations
//!
//! The part-vs-obstacle test only tries the obstacle's edge normals as
//! separating axes, never the part's. Obstacles are the irregular shapes;
//! parts are coarse boxes and act as probes.
//!
//! Resolution is single pass. Pushes from every part and obstacle are
//! summed and applied once, with no iteration to a fixed point, so a
//! vehicle wedged between two obstacles on opposite sides can receive
//! pushes that cancel out.

use bitflags::bitflags;

use crate::config::CollisionConfig;
use crate::foundation::math::{Point2, Vec2, Vec3};
use super::extraction::{project_to_hull, MeshSource, MovableSource};
use super::primitives::signed_edge_distance;
use super::registry::{ColliderRegistry, MeshXZCollider};

bitflags! {
    /// Selection of vehicle parts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PartSet: u8 {
        /// Undercarriage and tracks
        const BASE = 1 << 0;
        /// Turret cab
        const BODY = 1 << 1;
        /// First arm segment
        const BOOM = 1 << 2;
        /// Second arm segment
        const STICK = 1 << 3;
        /// Bucket
        const BUCKET = 1 << 4;
        /// Parts that get pushed out of obstacles; the stick and bucket
        /// are left out so the bucket can reach into the dig pile
        const COLLIDING = Self::BASE.bits() | Self::BODY.bits() | Self::BOOM.bits();
    }
}

/// Handles to a vehicle's named parts
///
/// Any slot may be empty; empty slots are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleParts<N> {
    /// Undercarriage
    pub base: Option<N>,
    /// Turret cab
    pub body: Option<N>,
    /// Boom
    pub boom: Option<N>,
    /// Stick
    pub stick: Option<N>,
    /// Bucket
    pub bucket: Option<N>,
}

impl<N> Default for VehicleParts<N> {
    fn default() -> Self {
        Self { base: None, body: None, boom: None, stick: None, bucket: None }
    }
}

impl<N: Copy> VehicleParts<N> {
    /// Every filled slot in base-to-bucket order, tagged with its flag
    pub fn iter(&self) -> impl Iterator<Item = (PartSet, N)> {
        [
            (PartSet::BASE, self.base),
            (PartSet::BODY, self.body),
            (PartSet::BOOM, self.boom),
            (PartSet::STICK, self.stick),
            (PartSet::BUCKET, self.bucket),
        ]
        .into_iter()
        .filter_map(|(flag, node)| node.map(|n| (flag, n)))
    }

    /// Filled slots whose flag is in `set`
    pub fn select(&self, set: PartSet) -> impl Iterator<Item = N> {
        self.iter().filter(move |(flag, _)| set.contains(*flag)).map(|(_, n)| n)
    }

    /// Base, body and boom
    pub fn collision_parts(&self) -> impl Iterator<Item = N> {
        self.select(PartSet::COLLIDING)
    }
}

/// Outcome of [`CollisionResolver::resolve_circle`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleResolution {
    /// Resolved world X
    pub x: f32,
    /// Resolved world Z
    pub z: f32,
    /// True if any obstacle pushed the point
    pub adjusted: bool,
}

/// Push-out solver over a [`ColliderRegistry`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    padding: f32,
    epsilon: f32,
    colliding: PartSet,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(&CollisionConfig::default())
    }
}

impl CollisionResolver {
    /// Create a resolver with the tolerances from `config`
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            padding: config.hull_padding.max(0.0),
            epsilon: config.separation_epsilon.max(0.0),
            colliding: PartSet::COLLIDING,
        }
    }

    /// Override which vehicle parts are pushed out of obstacles
    pub fn with_colliding_parts(mut self, parts: PartSet) -> Self {
        self.colliding = parts;
        self
    }

    /// Boundary shrink applied to every obstacle
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Extra separation added to every push
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Parts [`resolve_vehicle`](Self::resolve_vehicle) tests
    pub fn colliding_parts(&self) -> PartSet {
        self.colliding
    }

    /// Keep a circle of `radius` centered at `(x, z)` outside every obstacle
    ///
    /// When the circle's bounding square overlaps a pass-through zone the
    /// whole query is skipped. Otherwise each obstacle is tested in turn
    /// from the position left by the previous one: the point's distance to
    /// the hull is the largest signed distance over the edge lines, and if
    /// that is within `radius - padding` the point is pushed out along the
    /// matching normal.
    pub fn resolve_circle(&self, registry: &ColliderRegistry, x: f32, z: f32, radius: f32) -> CircleResolution {
        let mut resolution = CircleResolution { x, z, adjusted: false };
        if registry.in_pass_through_zone(x, z, radius) {
            return resolution;
        }

        let effective_radius = (radius - self.padding).max(0.0);
        for collider in registry.obstacles().iter().filter(|c| c.is_valid()) {
            let p = Point2::new(resolution.x, resolution.z);
            let Some((max_distance, normal)) = Self::nearest_separating_edge(collider, p) else {
                continue;
            };
            if max_distance <= effective_radius {
                let push = normal * ((effective_radius - max_distance) + self.epsilon);
                resolution.x += push.x;
                resolution.z += push.y;
                resolution.adjusted = true;
            }
        }
        resolution
    }

    /// Largest signed distance from `p` to any edge line, with that edge's normal
    fn nearest_separating_edge(collider: &MeshXZCollider, p: Point2) -> Option<(f32, Vec2)> {
        collider
            .edge_normals()
            .map(|(a, n)| (signed_edge_distance(n, a, p), n))
            .fold(None, |best, (d, n)| match best {
                Some((best_d, _)) if best_d >= d => best,
                _ => Some((d, n)),
            })
    }

    /// Sum of the pushes needed to clear every obstacle, per part
    ///
    /// Parts whose hull is degenerate, or which have any hull vertex inside
    /// a pass-through zone, contribute nothing. Returns `None` when nothing
    /// penetrates.
    pub fn vehicle_push<S, I>(&self, registry: &ColliderRegistry, source: &S, parts: I) -> Option<Vec2>
    where
        S: MeshSource + ?Sized,
        I: IntoIterator<Item = S::Node>,
    {
        let mut total = Vec2::zeros();
        let mut pushed = false;

        for part in parts {
            let hull = project_to_hull(source, part, None);
            if hull.len() < 3 {
                continue;
            }
            if hull.iter().any(|v| registry.zones().iter().any(|z| z.contains(v.x, v.y))) {
                log::trace!("vehicle_push: {} straddles a pass-through zone", source.node_label(part));
                continue;
            }
            for collider in registry.obstacles().iter().filter(|c| c.is_valid()) {
                if let Some(push) = self.part_push(collider, &hull) {
                    total += push;
                    pushed = true;
                }
            }
        }

        pushed.then_some(total)
    }

    /// Push that separates `part_hull` from one obstacle, if they overlap
    ///
    /// For each obstacle edge the part's closest approach is its smallest
    /// vertex distance to the edge line; the edge with the largest closest
    /// approach is the best separating axis.
    fn part_push(&self, collider: &MeshXZCollider, part_hull: &[Point2]) -> Option<Vec2> {
        let (best, normal) = collider
            .edge_normals()
            .map(|(a, n)| {
                let closest = part_hull
                    .iter()
                    .map(|&v| signed_edge_distance(n, a, v))
                    .fold(f32::INFINITY, f32::min);
                (closest, n)
            })
            .fold(None, |best: Option<(f32, Vec2)>, (d, n)| match best {
                Some((best_d, _)) if best_d >= d => best,
                _ => Some((d, n)),
            })?;

        (best < -self.padding).then(|| normal * ((-self.padding - best) + self.epsilon))
    }

    /// Push the vehicle root out of every obstacle its colliding parts overlap
    ///
    /// Only the parts in [`colliding_parts`](Self::colliding_parts) (base,
    /// body and boom by default) are tested. The accumulated push is
    /// applied once to the root's horizontal position. Returns whether any
    /// part penetrated, even if the pushes cancelled.
    pub fn resolve_vehicle<S: MovableSource + ?Sized>(
        &self,
        registry: &ColliderRegistry,
        scene: &mut S,
        root: S::Node,
        parts: &VehicleParts<S::Node>,
    ) -> bool {
        if registry.obstacle_count() == 0 {
            return false;
        }
        if !scene.contains_node(root) {
            log::debug!("resolve_vehicle: root {:?} is not in the scene", root);
            return false;
        }
        let Some(push) = self.vehicle_push(registry, &*scene, parts.select(self.colliding)) else {
            return false;
        };
        log::debug!(
            "resolve_vehicle: pushing {} by ({:.4}, {:.4})",
            scene.node_label(root),
            push.x,
            push.y
        );
        scene.translate_node(root, Vec3::new(push.x, 0.0, push.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::Transform;
    use crate::physics::collision::NoCollisionZone;
    use crate::scene::{MeshData, NodeKey, SceneGraph};

    fn rect(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Vec<Point2> {
        vec![
            Point2::new(min_x, min_z),
            Point2::new(max_x, min_z),
            Point2::new(max_x, max_z),
            Point2::new(min_x, max_z),
        ]
    }

    fn unit_square_registry() -> ColliderRegistry {
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(-1.0, -1.0, 1.0, 1.0));
        registry
    }

    /// Root with a single box part, both at the origin
    fn box_vehicle(scene: &mut SceneGraph) -> (NodeKey, NodeKey) {
        let root = scene.add_node("root", Transform::identity(), None);
        let part = scene
            .add_child(root, "base", Transform::identity(), Some(MeshData::cuboid(Vec3::new(1.0, 0.5, 1.0))))
            .unwrap();
        (root, part)
    }

    #[test]
    fn test_circle_empty_registry_never_adjusts() {
        let resolver = CollisionResolver::default();
        let registry = ColliderRegistry::new();
        for &(x, z, r) in &[(0.0, 0.0, 0.5), (-3.0, 7.0, 10.0), (1e6, -1e6, 0.0)] {
            let res = resolver.resolve_circle(&registry, x, z, r);
            assert_eq!(res, CircleResolution { x, z, adjusted: false });
        }
    }

    #[test]
    fn test_circle_inside_square_pushed_out() {
        let resolver = CollisionResolver::default();
        let registry = unit_square_registry();
        let res = resolver.resolve_circle(&registry, 0.0, 0.0, 0.5);

        assert!(res.adjusted);
        // Ties between equally deep edges go to the first edge, normal (0, -1)
        assert_relative_eq!(res.x, 0.0);
        assert_relative_eq!(res.z, -1.496, epsilon = 1e-5);
        let effective = 0.5 - resolver.padding();
        let distance = -res.z - 1.0;
        assert_relative_eq!(distance, effective + resolver.epsilon(), epsilon = 1e-5);
    }

    #[test]
    fn test_circle_large_radius_clears_effective_radius() {
        let resolver = CollisionResolver::default();
        let registry = unit_square_registry();
        let res = resolver.resolve_circle(&registry, 0.0, 0.0, 1.5);

        assert!(res.adjusted);
        let push = (res.x * res.x + res.z * res.z).sqrt();
        // Minimum penetration depth from the centroid is half-width + radius
        assert!(push >= 1.0 + 1.5 - resolver.padding());
        assert!(-res.z - 1.0 >= 1.5 - resolver.padding());
    }

    #[test]
    fn test_circle_far_away_untouched() {
        let resolver = CollisionResolver::default();
        let registry = unit_square_registry();
        let res = resolver.resolve_circle(&registry, 5.0, 5.0, 0.5);
        assert_eq!(res, CircleResolution { x: 5.0, z: 5.0, adjusted: false });
    }

    #[test]
    fn test_circle_grazing_within_padding_untouched() {
        let resolver = CollisionResolver::default();
        let registry = unit_square_registry();
        // Circle reaches x = 0.998; the 0.002 overlap is inside the padding band
        let res = resolver.resolve_circle(&registry, 1.498, 0.0, 0.5);
        assert!(!res.adjusted);
    }

    #[test]
    fn test_circle_in_zone_never_adjusted() {
        let resolver = CollisionResolver::default();
        let mut registry = unit_square_registry();
        registry.add_zone(NoCollisionZone::new(0.0, 0.0, 0.5, 0.5, 0.3));
        let res = resolver.resolve_circle(&registry, 0.1, -0.1, 0.25);
        assert_eq!(res, CircleResolution { x: 0.1, z: -0.1, adjusted: false });
    }

    #[test]
    fn test_circle_obstacles_applied_in_sequence() {
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(-1.0, 0.0, 1.0, 2.0));
        registry.add_hull(rect(-1.0, -3.0, 1.0, -0.8));
        // The start point is clear of the second box; the first push to
        // z = -0.496 brings it within reach, and the second box sees that
        let res = resolver.resolve_circle(&registry, 0.0, 0.5, 0.5);
        assert!(res.adjusted);
        assert_relative_eq!(res.z, -0.304, epsilon = 1e-5);
    }

    #[test]
    fn test_vehicle_no_obstacles_no_adjustment() {
        let resolver = CollisionResolver::default();
        let registry = ColliderRegistry::new();
        let mut scene = SceneGraph::new();
        let (root, base) = box_vehicle(&mut scene);
        let parts = VehicleParts { base: Some(base), ..Default::default() };

        assert!(!resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
        assert_eq!(scene.world_position(root), Some(Vec3::zeros()));
    }

    #[test]
    fn test_vehicle_single_obstacle_push() {
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(0.5, -3.0, 3.0, 3.0));
        let mut scene = SceneGraph::new();
        let (root, base) = box_vehicle(&mut scene);
        let parts = VehicleParts { base: Some(base), ..Default::default() };

        assert!(resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
        let pos = scene.world_position(root).unwrap();
        assert_relative_eq!(pos.x, -0.496, epsilon = 1e-5);
        assert_relative_eq!(pos.y, 0.0);
        assert_relative_eq!(pos.z, 0.0, epsilon = 1e-6);

        // One push clears the overlap
        assert!(!resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
    }

    #[test]
    fn test_vehicle_removed_root_not_adjusted() {
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(0.5, -3.0, 3.0, 3.0));
        let mut scene = SceneGraph::new();
        let (root, _) = box_vehicle(&mut scene);
        // A live part overlapping the obstacle, hanging off a root that is gone
        let stray = scene.add_node(
            "stray_base",
            Transform::identity(),
            Some(MeshData::cuboid(Vec3::new(1.0, 0.5, 1.0))),
        );
        scene.remove(root);
        let parts = VehicleParts { base: Some(stray), ..Default::default() };

        assert!(!resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
        assert_eq!(scene.world_position(stray), Some(Vec3::zeros()));
    }

    #[test]
    fn test_circle_clockwise_hull_still_pushes() {
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(vec![
            Point2::new(-1.0, -1.0),
            Point2::new(-1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, -1.0),
        ]);
        let result = resolver.resolve_circle(&registry, 0.0, 0.0, 0.5);
        assert!(result.adjusted);
    }

    #[test]
    fn test_vehicle_opposing_obstacles_cancel() {
        // Single-pass accumulation: the two pushes sum to zero and the
        // vehicle stays wedged. Changing this must be deliberate.
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(-3.0, -3.0, -0.5, 3.0));
        registry.add_hull(rect(0.5, -3.0, 3.0, 3.0));
        let mut scene = SceneGraph::new();
        let (root, base) = box_vehicle(&mut scene);
        let parts = VehicleParts { base: Some(base), ..Default::default() };

        let push = resolver.vehicle_push(&registry, &scene, parts.collision_parts()).unwrap();
        assert_relative_eq!(push.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(push.y, 0.0, epsilon = 1e-6);

        assert!(resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
        let pos = scene.world_position(root).unwrap();
        assert_relative_eq!(pos.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pos.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_vehicle_bucket_excluded() {
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(-2.0, -2.0, 2.0, 2.0));
        let mut scene = SceneGraph::new();
        let root = scene.add_node("root", Transform::identity(), None);
        let bucket = scene
            .add_child(root, "bucket", Transform::identity(), Some(MeshData::cuboid(Vec3::new(0.4, 0.3, 0.4))))
            .unwrap();
        let parts = VehicleParts { bucket: Some(bucket), ..Default::default() };

        assert!(resolver.vehicle_push(&registry, &scene, [bucket]).is_some());
        assert!(!resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
        assert_eq!(scene.world_position(root), Some(Vec3::zeros()));
    }

    #[test]
    fn test_vehicle_part_in_zone_skipped() {
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(0.5, -3.0, 3.0, 3.0));
        // Doorway covering one corner of the base footprint
        registry.add_zone(NoCollisionZone::new(1.0, 1.0, 0.2, 0.2, 0.0));
        let mut scene = SceneGraph::new();
        let (root, base) = box_vehicle(&mut scene);
        let parts = VehicleParts { base: Some(base), ..Default::default() };

        assert!(!resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
    }

    #[test]
    fn test_vehicle_follows_part_pose() {
        // Boom swung out over an obstacle while the base stays clear
        let resolver = CollisionResolver::default();
        let mut registry = ColliderRegistry::new();
        registry.add_hull(rect(3.0, -1.0, 5.0, 1.0));
        let mut scene = SceneGraph::new();
        let root = scene.add_node("root", Transform::identity(), None);
        let boom = scene
            .add_child(root, "boom", Transform::identity(), Some(MeshData::cuboid(Vec3::new(0.2, 0.2, 0.2))))
            .unwrap();
        let parts = VehicleParts { boom: Some(boom), ..Default::default() };
        assert!(!resolver.resolve_vehicle(&registry, &mut scene, root, &parts));

        scene.set_position(boom, Vec3::new(3.1, 0.0, 0.0));
        assert!(resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
        let pos = scene.world_position(root).unwrap();
        // Boom spans x in [2.9, 3.3], so the push is 0.3 - padding + epsilon
        assert_relative_eq!(pos.x, -0.296, epsilon = 1e-5);
    }

    #[test]
    fn test_part_selection() {
        let parts = VehicleParts { base: Some(1), body: Some(2), boom: None, stick: Some(4), bucket: Some(5) };
        assert_eq!(parts.collision_parts().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(parts.select(PartSet::all()).count(), 4);
        assert_eq!(parts.select(PartSet::BUCKET).collect::<Vec<_>>(), vec![5]);

        let resolver = CollisionResolver::default().with_colliding_parts(PartSet::BASE);
        assert_eq!(resolver.colliding_parts(), PartSet::BASE);
    }

    #[test]
    fn test_resolver_takes_config_tolerances() {
        let config = CollisionConfig { hull_padding: 0.0, separation_epsilon: 0.0, ..Default::default() };
        let resolver = CollisionResolver::new(&config);
        let registry = unit_square_registry();
        let res = resolver.resolve_circle(&registry, 0.0, 0.0, 0.5);
        assert_relative_eq!(res.z, -1.5, epsilon = 1e-6);
    }
}
