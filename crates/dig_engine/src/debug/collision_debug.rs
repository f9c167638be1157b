//! Hull outlines for the XZ collision system
//!
//! Each `draw_*` call replaces the previous outlines of its category, so
//! calling them every frame never accumulates stale segments. Nothing here
//! touches collision state.

use crate::config::CollisionConfig;
use crate::debug::draw::{DebugDrawSystem, DebugShape};
use crate::foundation::math::{Point2, Vec3, Vec4};
use crate::physics::collision::{project_to_hull, ColliderRegistry, MeshSource, VehicleParts};

const OBSTACLE_PREFIX: &str = "obstacle_hull_";
const PART_PREFIX: &str = "part_hull_";
const ZONE_PREFIX: &str = "zone_";

/// Outline colors
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Registered obstacle hulls
    pub obstacle: Vec4,
    /// Vehicle part hulls
    pub part: Vec4,
    /// Pass-through zones
    pub zone: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            obstacle: Vec4::new(1.0, 0.0, 0.0, 1.0), // Red
            part: Vec4::new(0.0, 1.0, 0.0, 1.0),     // Green
            zone: Vec4::new(1.0, 1.0, 0.0, 1.0),     // Yellow
        }
    }
}

/// Draws obstacle, part and zone outlines into a [`DebugDrawSystem`]
#[derive(Debug)]
pub struct CollisionDebugVisualizer {
    debug_draw: DebugDrawSystem,
    colors: CollisionDebugColors,
    obstacle_height: f32,
    part_height: f32,
}

impl CollisionDebugVisualizer {
    /// Create a visualizer drawing at the configured heights
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            colors: CollisionDebugColors::default(),
            obstacle_height: config.rock_debug_height,
            part_height: config.part_debug_height,
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Outline every registered obstacle hull; returns the segment count
    pub fn draw_obstacle_hulls(&mut self, registry: &ColliderRegistry) -> usize {
        self.debug_draw.clear_persistent_prefix(OBSTACLE_PREFIX);
        let mut segments = 0;
        for (i, collider) in registry.obstacles().iter().enumerate() {
            if !collider.is_valid() {
                continue;
            }
            segments += self.draw_loop(
                &format!("{OBSTACLE_PREFIX}{i}"),
                &collider.hull,
                self.obstacle_height,
                self.colors.obstacle,
            );
        }
        segments
    }

    /// Outline the live hull of every filled part slot, bucket included
    pub fn draw_part_hulls<S: MeshSource + ?Sized>(
        &mut self,
        scene: &S,
        parts: &VehicleParts<S::Node>,
    ) -> usize {
        self.debug_draw.clear_persistent_prefix(PART_PREFIX);
        let mut segments = 0;
        for (flag, node) in parts.iter() {
            let hull = project_to_hull(scene, node, None);
            if hull.len() < 3 {
                continue;
            }
            segments += self.draw_loop(
                &format!("{PART_PREFIX}{:02x}", flag.bits()),
                &hull,
                self.part_height,
                self.colors.part,
            );
        }
        segments
    }

    /// Outline every pass-through zone at the obstacle height
    pub fn draw_zones(&mut self, registry: &ColliderRegistry) -> usize {
        self.debug_draw.clear_persistent_prefix(ZONE_PREFIX);
        let mut segments = 0;
        for (i, zone) in registry.zones().iter().enumerate() {
            segments += self.draw_loop(
                &format!("{ZONE_PREFIX}{i}"),
                &zone.corners(),
                self.obstacle_height,
                self.colors.zone,
            );
        }
        segments
    }

    fn draw_loop(&mut self, key: &str, polygon: &[Point2], height: f32, color: Vec4) -> usize {
        let n = polygon.len();
        for i in 0..n {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            self.debug_draw.draw_persistent(
                format!("{key}_{i}"),
                DebugShape::Line {
                    start: Vec3::new(a.x, height, a.y),
                    end: Vec3::new(b.x, height, b.y),
                    color,
                    duration: f32::INFINITY,
                },
            );
        }
        n
    }

    /// Remove every outline
    pub fn clear(&mut self) {
        self.debug_draw.clear();
    }

    /// Expire temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        self.debug_draw.update(delta_time);
    }

    /// Every shape for rendering
    pub fn shapes(&self) -> Vec<&DebugShape> {
        self.debug_draw.shapes()
    }

    /// Enable/disable drawing
    pub fn set_enabled(&mut self, enabled: bool) {
        self.debug_draw.enabled = enabled;
    }

    /// Check if drawing is enabled
    pub fn is_enabled(&self) -> bool {
        self.debug_draw.enabled
    }

    /// Underlying draw system
    pub fn debug_draw(&self) -> &DebugDrawSystem {
        &self.debug_draw
    }

    /// Underlying draw system, mutably
    pub fn debug_draw_mut(&mut self) -> &mut DebugDrawSystem {
        &mut self.debug_draw
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new(&CollisionConfig::default())
    }
}
