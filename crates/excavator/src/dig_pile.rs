//! Diggable material pile
//!
//! A cylinder with a dome on top, shrunk uniformly each time the bucket
//! scoops from it.

use dig_engine::foundation::math::{Transform, Vec3};
use dig_engine::scene::{MeshData, NodeKey, SceneGraph};

/// Height of the pile's cylinder at full scale
pub const CYLINDER_HEIGHT: f32 = 1.5;

/// Dome radius relative to the base radius
pub const DOME_RATIO: f32 = 0.8;

const CYLINDER_TOLERANCE: f32 = 0.05;
const DOME_TOLERANCE: f32 = 0.02;
const MESH_SEGMENTS: u32 = 16;

/// Material pile the bucket digs from
#[derive(Debug)]
pub struct DigPile {
    node: Option<NodeKey>,
    position: Vec3,
    radius: f32,
    scale: f32,
    min_scale: f32,
}

impl DigPile {
    /// Spawn a full pile at `position`
    pub fn new(scene: &mut SceneGraph, position: Vec3, radius: f32, min_scale: f32) -> Self {
        let mut pile = Self {
            node: None,
            position,
            radius,
            scale: 1.0,
            min_scale: min_scale.clamp(0.0, 1.0),
        };
        pile.spawn(scene);
        pile
    }

    fn spawn(&mut self, scene: &mut SceneGraph) -> NodeKey {
        let group = scene.add_node(
            "dig_pile",
            Transform::from_position(self.position).with_scale(Vec3::repeat(self.scale)),
            None,
        );
        scene.add_child(
            group,
            "pile_cylinder",
            Transform::from_position(Vec3::new(0.0, CYLINDER_HEIGHT * 0.5, 0.0)),
            Some(MeshData::cylinder(self.radius, CYLINDER_HEIGHT, MESH_SEGMENTS)),
        );
        scene.add_child(
            group,
            "pile_dome",
            Transform::from_position(Vec3::new(0.0, CYLINDER_HEIGHT, 0.0)),
            Some(MeshData::dome(self.radius * DOME_RATIO, MESH_SEGMENTS / 2, MESH_SEGMENTS)),
        );
        self.node = Some(group);
        group
    }

    /// Pile node, `None` once removed from the scene
    pub fn node(&self) -> Option<NodeKey> {
        self.node
    }

    /// Base center on the ground
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current uniform scale, 1.0 when full
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Check whether `point` is inside the pile's current volume
    ///
    /// The volume is the cylinder from the ground to `1.5 * scale` plus the
    /// dome on top of it, each with a small tolerance.
    pub fn is_in_zone(&self, point: Vec3) -> bool {
        let r = self.radius * self.scale;
        let cylinder_top = self.position.y + CYLINDER_HEIGHT * self.scale;
        let dome_radius = self.radius * DOME_RATIO * self.scale;

        let dx = point.x - self.position.x;
        let dz = point.z - self.position.z;
        let dist_xz = (dx * dx + dz * dz).sqrt();

        let in_cylinder = point.y >= self.position.y
            && point.y <= cylinder_top
            && dist_xz <= r + CYLINDER_TOLERANCE;

        let above = point.y - cylinder_top;
        let reach = dome_radius + DOME_TOLERANCE;
        let in_dome = above >= 0.0 && dist_xz * dist_xz + above * above <= reach * reach;

        in_cylinder || in_dome
    }

    /// Shrink the pile by `fraction` of its current scale
    ///
    /// The scale never drops below the minimum. Returns false when nothing
    /// changed (non-positive fraction, or already at the minimum).
    pub fn dig(&mut self, scene: &mut SceneGraph, fraction: f32) -> bool {
        if fraction <= 0.0 {
            return false;
        }
        let old = self.scale;
        self.scale = (self.scale * (1.0 - fraction)).max(self.min_scale);
        if (self.scale - old).abs() < 1e-4 {
            return false;
        }
        if let Some(node) = self.node {
            scene.set_scale(node, Vec3::repeat(self.scale));
        }
        log::debug!("Dig pile scaled to {:.3}", self.scale);
        true
    }

    /// Take the pile out of the scene
    pub fn remove(&mut self, scene: &mut SceneGraph) {
        if let Some(node) = self.node.take() {
            scene.remove(node);
        }
    }

    /// Restore a full pile, respawning it if it was removed
    ///
    /// Returns the pile node.
    pub fn reset(&mut self, scene: &mut SceneGraph) -> NodeKey {
        self.scale = 1.0;
        match self.node.filter(|&node| scene.contains(node)) {
            Some(node) => {
                scene.set_scale(node, Vec3::repeat(1.0));
                node
            }
            None => self.spawn(scene),
        }
    }
}
