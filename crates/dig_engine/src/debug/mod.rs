//! Debug visualization
//!
//! Line and point overlays plus the collision hull visualizer. All of it
//! is inspection-only and never feeds back into simulation.

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugShape, DebugDrawSystem, DebugShapeId};
pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};
