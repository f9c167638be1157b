//! # Dig Engine
//!
//! The engine side of the excavator sandbox: a scene graph, XZ-plane
//! convex-hull collision, configuration and debug overlays.
//!
//! ## Features
//!
//! - **Scene Graph**: `slotmap`-backed node hierarchy with procedural meshes
//! - **Hull Collision**: monotone-chain footprints, obstacle registry,
//!   pass-through zones, circle and multi-part vehicle push-out
//! - **Configuration**: serde structs loadable from TOML or RON
//! - **Debug Drawing**: hull, part and zone outlines
//!
//! ## Quick Start
//!
//! ```rust
//! use dig_engine::prelude::*;
//!
//! let mut scene = SceneGraph::new();
//! let mut registry = ColliderRegistry::new();
//!
//! let rock = scene.add_node(
//!     "rock",
//!     Transform::from_position(Vec3::new(1.5, 0.0, 0.0)),
//!     Some(MeshData::cuboid(Vec3::new(1.0, 1.0, 1.0))),
//! );
//! registry.add_obstacle(&scene, rock);
//!
//! let root = scene.add_node("vehicle", Transform::identity(), None);
//! let base = scene
//!     .add_child(root, "base", Transform::identity(), Some(MeshData::cuboid(Vec3::new(1.0, 0.5, 1.0))))
//!     .unwrap();
//!
//! let resolver = CollisionResolver::default();
//! let parts = VehicleParts { base: Some(base), ..Default::default() };
//! assert!(resolver.resolve_vehicle(&registry, &mut scene, root, &parts));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod physics;
pub mod debug;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, ConfigError},
        debug::{CollisionDebugVisualizer, DebugDrawSystem, DebugShape},
        foundation::math::{Point2, Quat, Transform, Vec2, Vec3, Vec4},
        physics::collision::{
            convex_hull, project_to_hull, CircleResolution, ColliderRegistry, CollisionResolver,
            MeshSource, MeshXZCollider, MovableSource, NoCollisionZone, PartSet, VehicleParts,
        },
        scene::{MeshData, NodeKey, SceneGraph, AABB},
    };
}
