//! Debug line and point overlay
//!
//! Shapes are plain data; whatever renders the scene pulls them with
//! [`DebugDrawSystem::shapes`] each frame. Temporary shapes expire after
//! their duration, persistent ones stay until removed by key.

use crate::foundation::math::{Vec3, Vec4};
use std::collections::BTreeMap;

/// Key of a persistent debug shape
pub type DebugShapeId = String;

/// Debug shape primitives
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        /// World-space start point
        start: Vec3,
        /// World-space end point
        end: Vec3,
        /// RGBA color
        color: Vec4,
        /// Seconds left; infinite for persistent shapes
        duration: f32,
    },

    /// Marker at a position
    Point {
        /// World-space position
        position: Vec3,
        /// RGBA color
        color: Vec4,
        /// Marker size in world units
        size: f32,
        /// Seconds left; infinite for persistent shapes
        duration: f32,
    },
}

impl DebugShape {
    /// Remaining lifetime in seconds
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::Line { duration, .. } | DebugShape::Point { duration, .. } => *duration,
        }
    }

    /// Color of the shape
    pub fn color(&self) -> Vec4 {
        match self {
            DebugShape::Line { color, .. } | DebugShape::Point { color, .. } => *color,
        }
    }

    /// Replace the lifetime
    pub fn with_duration(mut self, new_duration: f32) -> Self {
        match &mut self {
            DebugShape::Line { duration, .. } | DebugShape::Point { duration, .. } => {
                *duration = new_duration;
            }
        }
        self
    }

    /// Age the shape by `delta_time`; true once it has expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self {
            DebugShape::Line { duration, .. } | DebugShape::Point { duration, .. } => {
                *duration -= delta_time;
                *duration <= 0.0
            }
        }
    }
}

/// Collects debug shapes between frames
#[derive(Debug)]
pub struct DebugDrawSystem {
    temporary_shapes: Vec<DebugShape>,
    // Ordered so prefix removal and iteration are deterministic
    persistent_shapes: BTreeMap<DebugShapeId, DebugShape>,

    /// Master switch; a disabled system drops new shapes and reports none
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create an empty, enabled system
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: BTreeMap::new(),
            enabled: true,
        }
    }

    /// Draw a temporary line
    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4, duration: f32) {
        if !self.enabled {
            return;
        }
        self.temporary_shapes.push(DebugShape::Line { start, end, color, duration });
    }

    /// Draw a temporary point
    pub fn draw_point(&mut self, position: Vec3, color: Vec4, size: f32, duration: f32) {
        if !self.enabled {
            return;
        }
        self.temporary_shapes.push(DebugShape::Point { position, color, size, duration });
    }

    /// Insert or replace a persistent shape
    pub fn draw_persistent(&mut self, id: impl Into<String>, shape: DebugShape) {
        if !self.enabled {
            return;
        }
        self.persistent_shapes.insert(id.into(), shape);
    }

    /// Remove one persistent shape
    pub fn clear_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Remove every persistent shape whose key starts with `prefix`
    pub fn clear_persistent_prefix(&mut self, prefix: &str) -> usize {
        let before = self.persistent_shapes.len();
        self.persistent_shapes.retain(|id, _| !id.starts_with(prefix));
        before - self.persistent_shapes.len()
    }

    /// Remove every persistent shape
    pub fn clear_all_persistent(&mut self) {
        self.persistent_shapes.clear();
    }

    /// Expire temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }
        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Every live shape, temporary first
    pub fn shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }
        self.temporary_shapes.iter()
            .chain(self.persistent_shapes.values())
            .collect()
    }

    /// Persistent shapes whose key starts with `prefix`
    pub fn persistent_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a DebugShape)> + 'a {
        self.persistent_shapes
            .iter()
            .filter(move |(id, _)| id.starts_with(prefix))
            .map(|(id, shape)| (id.as_str(), shape))
    }

    /// Number of live shapes
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}
