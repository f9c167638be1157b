//! Scene graph
//!
//! A small node hierarchy holding local transforms and vertex buffers.
//! It is the engine's implementation of the collision module's
//! [`MeshSource`](crate::physics::collision::MeshSource) capability: the
//! collision code asks it for world-space vertices and never sees the
//! concrete node type.
//!
//! ```text
//! root ──┬── base (mesh)
//!        └── turret pivot ── body (mesh)
//!                        └── boom pivot ── boom (mesh) ...
//! ```

mod scene_graph;
mod mesh;

pub use scene_graph::{SceneGraph, SceneNode, NodeKey, AABB};
pub use mesh::MeshData;
