//! XZ-plane convex-hull collision
//!
//! Obstacles are registered as the convex hull of their mesh projected
//! onto the ground plane. Each frame the vehicle's chassis parts are
//! hulled the same way and tested against every obstacle; the combined
//! push is applied once to the vehicle root.
//!
//! # Module Organization
//!
//! - [`primitives`] - cross product, edge normals, pass-through zones
//! - [`hull`] - Andrew's monotone chain
//! - [`extraction`] - the [`MeshSource`] capability and mesh-to-hull projection
//! - [`registry`] - obstacle hulls and pass-through zones
//! - [`resolver`] - circle and multi-part vehicle push-out

pub mod primitives;
pub mod hull;
pub mod extraction;
pub mod registry;
pub mod resolver;

pub use primitives::NoCollisionZone;
pub use hull::convex_hull;
pub use extraction::{project_to_hull, MeshSource, MovableSource};
pub use registry::{ColliderRegistry, MeshXZCollider};
pub use resolver::{CircleResolution, CollisionResolver, PartSet, VehicleParts};
