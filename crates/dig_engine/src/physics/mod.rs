//! Physics module for collision detection and response
//!
//! Collision here is deliberately narrow: static obstacles are convex
//! footprints on the XZ plane and the only response is a horizontal push
//! of the vehicle root. There is no broad phase, no rotational response
//! and no 3D contact.

pub mod collision;

pub use collision::{
    ColliderRegistry,
    CollisionResolver,
    CircleResolution,
    MeshXZCollider,
    NoCollisionZone,
    PartSet,
    VehicleParts,
};
