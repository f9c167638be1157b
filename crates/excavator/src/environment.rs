//! Arena setup and the dig loop
//!
//! Generation registers obstacles in a fixed order: perimeter rocks, the
//! inner rail ring, the gate, and the dig pile last. The pile must stay
//! the most recent obstacle because digging updates it with
//! `update_last_obstacle` and depletion drops it with
//! `remove_last_obstacle`.

use dig_engine::foundation::math::{constants, Transform, Vec2, Vec3};
use dig_engine::physics::collision::{ColliderRegistry, NoCollisionZone};
use dig_engine::scene::{MeshData, NodeKey, SceneGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ArenaConfig, DigConfig, GameConfig};
use crate::dig_pile::DigPile;
use crate::error::{GameError, GameResult};
use crate::excavator::Excavator;

/// Height of the gate lintel's underside
const LINTEL_HEIGHT: f32 = 2.3;

/// Result of a scoop attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoopOutcome {
    /// Bucket not in the pile, already full, or the pile is gone
    Missed,
    /// Material taken; `scoops` so far
    Scooped {
        /// Scoops taken from this pile
        scoops: u32,
    },
    /// That scoop emptied the pile; it is gone from scene and registry
    Depleted,
}

/// Static arena contents plus dig state
#[derive(Debug)]
pub struct Environment {
    arena: ArenaConfig,
    dig: DigConfig,
    obstacle_min_y: f32,
    rocks: Vec<NodeKey>,
    structures: Vec<NodeKey>,
    doorway: Option<NoCollisionZone>,
    pile: Option<DigPile>,
    scoops: u32,
    pile_gone: bool,
}

impl Environment {
    /// Create an empty environment; call [`generate`](Self::generate) to
    /// populate the scene
    pub fn new(config: &GameConfig) -> Self {
        Self {
            arena: config.arena.clone(),
            dig: config.dig.clone(),
            obstacle_min_y: config.collision.obstacle_min_y,
            rocks: Vec::new(),
            structures: Vec::new(),
            doorway: None,
            pile: None,
            scoops: 0,
            pile_gone: false,
        }
    }

    /// Build the arena, replacing anything generated before
    pub fn generate(&mut self, scene: &mut SceneGraph, registry: &mut ColliderRegistry) -> GameResult<()> {
        self.despawn(scene);
        registry.clear_all();

        self.spawn_perimeter_rocks(scene, registry)?;
        self.spawn_rails(scene, registry);
        self.spawn_gate(scene, registry)?;

        let pile = DigPile::new(scene, self.pile_position(), self.dig.pile_radius, self.dig.pile_min_scale);
        let node = pile.node().ok_or(GameError::MissingNode("dig_pile"))?;
        registry.add_obstacle(scene, node);
        self.pile = Some(pile);
        self.scoops = 0;
        self.pile_gone = false;

        log::info!(
            "Environment generated: {} rocks, {} structures, {} colliders, {} zones",
            self.rocks.len(),
            self.structures.len(),
            registry.obstacle_count(),
            registry.zone_count()
        );
        Ok(())
    }

    fn despawn(&mut self, scene: &mut SceneGraph) {
        for node in self.rocks.drain(..).chain(self.structures.drain(..)) {
            scene.remove(node);
        }
        if let Some(mut pile) = self.pile.take() {
            pile.remove(scene);
        }
        self.doorway = None;
    }

    fn spawn_perimeter_rocks(&mut self, scene: &mut SceneGraph, registry: &mut ColliderRegistry) -> GameResult<()> {
        let mut rng = StdRng::seed_from_u64(self.arena.random_seed);
        let count = self.arena.perimeter_rock_count;
        let scale = self.arena.rock_scale;

        for i in 0..count {
            let angle = i as f32 / count as f32 * constants::TAU;
            let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * self.arena.arena_radius;
            let yaw = rng.gen_range(0.0..constants::TAU);

            let rock = scene.add_node(
                format!("rock_{i}"),
                Transform::from_position(position).with_yaw(yaw).with_scale(Vec3::repeat(scale)),
                None,
            );
            scene
                .add_child(rock, "rock_boulder", Transform::identity(), Some(MeshData::dome(2.0, 4, 10)))
                .ok_or(GameError::MissingNode("rock_boulder"))?;
            // Buried footing; only the filtered silhouette keeps it out of the hull
            scene
                .add_child(
                    rock,
                    "rock_footing",
                    Transform::from_position(Vec3::new(0.0, -0.6, 0.0)),
                    Some(MeshData::cuboid(Vec3::new(2.5, 0.2, 2.5))),
                )
                .ok_or(GameError::MissingNode("rock_footing"))?;

            registry.add_obstacle_filtered(scene, rock, self.obstacle_min_y);
            self.rocks.push(rock);
        }
        log::debug!("Placed {} perimeter rocks", count);
        Ok(())
    }

    fn spawn_rails(&mut self, scene: &mut SceneGraph, registry: &mut ColliderRegistry) {
        let count = self.arena.rail_count;
        let offset = constants::PI / 8.0;
        for i in 0..count {
            let angle = i as f32 / count as f32 * constants::TAU + offset;
            let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * self.arena.rail_radius;
            // Long axis along the ring's tangent
            let rail = scene.add_node(
                format!("rail_{i}"),
                Transform::from_position(position).with_yaw(-(angle + constants::HALF_PI)),
                Some(MeshData::cuboid(Vec3::new(1.5, 0.6, 0.1))),
            );
            registry.add_obstacle(scene, rail);
            self.structures.push(rail);
        }
    }

    /// Two towers either side of a doorway with a lintel over it
    ///
    /// The lintel's footprint closes the doorway on the ground plane, so a
    /// pass-through zone is registered across it.
    fn spawn_gate(&mut self, scene: &mut SceneGraph, registry: &mut ColliderRegistry) -> GameResult<()> {
        let center = self.gate_position();
        let inward = self.gate_inward();
        let yaw = inward.x.atan2(inward.y);
        let half_gap = self.arena.doorway_half_width;
        let tower_half = 1.0;

        let gate = scene.add_node("gate", Transform::from_position(center).with_yaw(yaw), None);
        for (name, side) in [("gate_tower_left", -1.0), ("gate_tower_right", 1.0)] {
            let tower = scene
                .add_child(
                    gate,
                    name,
                    Transform::from_position(Vec3::new(side * (half_gap + tower_half), 2.0, 0.0)),
                    Some(MeshData::cuboid(Vec3::new(tower_half, 2.0, tower_half))),
                )
                .ok_or(GameError::MissingNode("gate tower"))?;
            registry.add_obstacle(scene, tower);
        }
        let lintel = scene
            .add_child(
                gate,
                "gate_lintel",
                Transform::from_position(Vec3::new(0.0, LINTEL_HEIGHT + 0.3, 0.0)),
                Some(MeshData::cuboid(Vec3::new(half_gap + 2.0 * tower_half, 0.3, 0.25))),
            )
            .ok_or(GameError::MissingNode("gate_lintel"))?;
        registry.add_obstacle(scene, lintel);

        // Zone yaw turns the other way round from node yaw
        let zone = NoCollisionZone::from_world(center, half_gap, self.arena.doorway_zone_half_depth, -yaw);
        registry.add_zone(zone);
        self.doorway = Some(zone);
        self.structures.push(gate);
        log::debug!("Gate at ({:.2}, {:.2}) with doorway zone yaw {:.3}", center.x, center.z, yaw);
        Ok(())
    }

    /// Gate center on the ground
    pub fn gate_position(&self) -> Vec3 {
        Vec3::new(self.arena.gate_x, 0.0, self.arena.gate_z)
    }

    /// Unit XZ direction from the gate toward the arena center
    fn gate_inward(&self) -> Vec2 {
        let outward = Vec2::new(self.arena.gate_x, self.arena.gate_z);
        let len = outward.norm();
        if len <= f32::EPSILON {
            return Vec2::new(0.0, -1.0);
        }
        -outward / len
    }

    /// Where the pile sits: in front of the gate, toward the arena center
    pub fn pile_position(&self) -> Vec3 {
        let inward = self.gate_inward() * self.arena.pile_offset;
        self.gate_position() + Vec3::new(inward.x, 0.0, inward.y)
    }

    /// Try to scoop from the pile with the excavator's bucket
    ///
    /// A scoop needs an empty bucket inside the pile's volume. It loads the
    /// bucket, shrinks the pile and refits its collider; once
    /// `scoops_to_deplete` scoops are taken the pile and its collider are
    /// removed.
    pub fn scoop(
        &mut self,
        scene: &mut SceneGraph,
        registry: &mut ColliderRegistry,
        excavator: &mut Excavator,
    ) -> ScoopOutcome {
        if self.pile_gone || excavator.is_bucket_loaded() {
            return ScoopOutcome::Missed;
        }
        let Some(pile) = self.pile.as_mut() else {
            return ScoopOutcome::Missed;
        };
        let Some(bucket) = excavator.bucket_world_position(scene) else {
            return ScoopOutcome::Missed;
        };
        if !pile.is_in_zone(bucket) {
            return ScoopOutcome::Missed;
        }

        excavator.load_bucket();
        if pile.dig(scene, self.dig.dig_fraction) {
            if let Some(node) = pile.node() {
                registry.update_last_obstacle(scene, node);
            }
        }
        self.scoops += 1;
        log::info!("Scoop {}/{}", self.scoops, self.dig.scoops_to_deplete);

        if self.scoops >= self.dig.scoops_to_deplete {
            pile.remove(scene);
            registry.remove_last_obstacle();
            self.pile_gone = true;
            log::info!("Dig pile depleted");
            return ScoopOutcome::Depleted;
        }
        ScoopOutcome::Scooped { scoops: self.scoops }
    }

    /// Restore a full pile and its collider
    pub fn reset_pile(&mut self, scene: &mut SceneGraph, registry: &mut ColliderRegistry) {
        let Some(pile) = self.pile.as_mut() else {
            return;
        };
        let node = pile.reset(scene);
        if self.pile_gone {
            registry.add_obstacle(scene, node);
        } else {
            registry.update_last_obstacle(scene, node);
        }
        self.scoops = 0;
        self.pile_gone = false;
    }

    /// The dig pile, if generated
    pub fn pile(&self) -> Option<&DigPile> {
        self.pile.as_ref()
    }

    /// Scoops taken from the current pile
    pub fn scoops(&self) -> u32 {
        self.scoops
    }

    /// Check whether the pile has been dug away
    pub fn is_pile_gone(&self) -> bool {
        self.pile_gone
    }

    /// Perimeter rock nodes
    pub fn rocks(&self) -> &[NodeKey] {
        &self.rocks
    }

    /// Pass-through zone across the gate doorway
    pub fn doorway(&self) -> Option<NoCollisionZone> {
        self.doorway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dig_engine::config::CollisionConfig;
    use dig_engine::physics::collision::{CollisionResolver, VehicleParts};

    fn generated() -> (SceneGraph, ColliderRegistry, Environment, GameConfig) {
        let config = GameConfig::default();
        let mut scene = SceneGraph::new();
        let mut registry = ColliderRegistry::new();
        let mut env = Environment::new(&config);
        env.generate(&mut scene, &mut registry).unwrap();
        (scene, registry, env, config)
    }

    /// Excavator parked with its bucket inside the pile
    fn digger(scene: &mut SceneGraph, env: &Environment, config: &GameConfig) -> Excavator {
        let pile = env.pile().unwrap().position();
        // Facing +Z, the bucket hangs 2.9 ahead of the root
        let start = Vec3::new(pile.x, 0.0, pile.z - 2.9);
        Excavator::new(scene, &config.excavator, &config.collision, start, constants::HALF_PI).unwrap()
    }

    #[test]
    fn test_generate_registers_everything() {
        let (_, registry, env, config) = generated();
        let arena = &config.arena;
        let expected = arena.perimeter_rock_count + arena.rail_count + 3 + 1;
        assert_eq!(registry.obstacle_count(), expected as usize);
        assert_eq!(registry.zone_count(), 1);
        assert_eq!(env.rocks().len(), 20);
        assert!(!env.is_pile_gone());
    }

    #[test]
    fn test_generate_is_repeatable() {
        let (mut scene, mut registry, mut env, _) = generated();
        let nodes = scene.len();
        let hulls: Vec<_> = registry.obstacles().to_vec();

        env.generate(&mut scene, &mut registry).unwrap();
        assert_eq!(scene.len(), nodes);
        assert_eq!(registry.obstacles(), &hulls[..]);
    }

    #[test]
    fn test_rock_hulls_ignore_buried_footing() {
        let (_, registry, _, config) = generated();
        let radius = config.arena.arena_radius;
        let rock = &registry.obstacles()[0];
        // Rock 0 sits at (radius, 0); the boulder is 1.0 across after scaling
        for p in &rock.hull {
            let d = ((p.x - radius).powi(2) + p.y.powi(2)).sqrt();
            assert!(d <= 1.0 + 1e-4, "hull point {p:?} reaches the footing");
        }
    }

    #[test]
    fn test_pile_sits_in_front_of_gate() {
        let (_, registry, env, _) = generated();
        let pile = env.pile().unwrap().position();
        assert_relative_eq!(pile.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pile.z, 15.7, epsilon = 1e-5);

        let doorway = env.doorway().unwrap();
        assert!(doorway.contains(0.0, 18.0));
        assert!(!doorway.contains(2.0, 18.0));
        assert_eq!(registry.zones()[0], doorway);
    }

    #[test]
    fn test_scoop_loop_depletes_pile() {
        let (mut scene, mut registry, mut env, config) = generated();
        let mut excavator = digger(&mut scene, &env, &config);
        let obstacles = registry.obstacle_count();
        let pile_hull = registry.obstacles().last().unwrap().hull.clone();

        assert_eq!(env.scoop(&mut scene, &mut registry, &mut excavator), ScoopOutcome::Scooped { scoops: 1 });
        assert!(excavator.is_bucket_loaded());
        assert_ne!(registry.obstacles().last().unwrap().hull, pile_hull);
        assert_eq!(registry.obstacle_count(), obstacles);

        // A full bucket cannot scoop again
        assert_eq!(env.scoop(&mut scene, &mut registry, &mut excavator), ScoopOutcome::Missed);

        for _ in 2..config.dig.scoops_to_deplete {
            excavator.unload_bucket();
            assert!(matches!(env.scoop(&mut scene, &mut registry, &mut excavator), ScoopOutcome::Scooped { .. }));
        }
        excavator.unload_bucket();
        assert_eq!(env.scoop(&mut scene, &mut registry, &mut excavator), ScoopOutcome::Depleted);
        assert!(env.is_pile_gone());
        assert_eq!(registry.obstacle_count(), obstacles - 1);
        assert!(env.pile().unwrap().node().is_none());

        excavator.unload_bucket();
        assert_eq!(env.scoop(&mut scene, &mut registry, &mut excavator), ScoopOutcome::Missed);

        env.reset_pile(&mut scene, &mut registry);
        assert_eq!(registry.obstacle_count(), obstacles);
        assert_eq!(registry.obstacles().last().unwrap().hull, pile_hull);
        assert_eq!(env.scoops(), 0);
    }

    #[test]
    fn test_scoop_needs_bucket_in_pile() {
        let (mut scene, mut registry, mut env, config) = generated();
        let mut excavator =
            Excavator::new(&mut scene, &config.excavator, &config.collision, Vec3::zeros(), 0.0).unwrap();
        assert_eq!(env.scoop(&mut scene, &mut registry, &mut excavator), ScoopOutcome::Missed);
        assert!(!excavator.is_bucket_loaded());
    }

    #[test]
    fn test_doorway_lets_vehicle_under_lintel() {
        let (mut scene, registry, env, _) = generated();
        let gate = env.gate_position();
        let resolver = CollisionResolver::new(&CollisionConfig::default());

        // A small cart parked in the doorway overlaps the lintel footprint
        let root = scene.add_node("cart", Transform::from_position(gate), None);
        let body = scene
            .add_child(root, "cart_body", Transform::identity(), Some(MeshData::cuboid(Vec3::new(0.5, 0.5, 0.5))))
            .unwrap();
        let parts = VehicleParts { base: Some(body), ..Default::default() };
        assert!(!resolver.resolve_vehicle(&registry, &mut scene, root, &parts));

        // Without the zone the lintel pushes it out
        let mut closed = registry.clone();
        closed.clear_zones();
        assert!(resolver.resolve_vehicle(&closed, &mut scene, root, &parts));
    }
}
