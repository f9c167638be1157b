//! Node hierarchy with parent-relative transforms
//!
//! Nodes live in a [`SlotMap`] so handles stay valid (or detectably stale)
//! across removals. World matrices are derived from the parent chain on
//! every read, so a query always reflects the current pose, including
//! joints that were rotated earlier in the same frame.

use slotmap::SlotMap;

use crate::foundation::math::{Mat4, Point3, Quat, Transform, Vec3};
use crate::physics::collision::{MeshSource, MovableSource};
use super::mesh::MeshData;

slotmap::new_key_type! {
    /// Handle to a node in a [`SceneGraph`]
    pub struct NodeKey;
}

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` when there are none
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self { min, max })
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}

/// One node of the hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Human-readable name, used in logs and lookups
    pub name: String,
    /// Transform relative to the parent (or the world for root nodes)
    pub transform: Transform,
    /// Renderable geometry, if this node has any
    pub mesh: Option<MeshData>,
    /// Render visibility; geometry queries ignore it
    pub visible: bool,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl SceneNode {
    fn new(name: impl Into<String>, transform: Transform, mesh: Option<MeshData>) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent handle, `None` for root nodes
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Direct children in insertion order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// Scene graph owning every node
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
}

impl SceneGraph {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root-level node
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        mesh: Option<MeshData>,
    ) -> NodeKey {
        self.nodes.insert(SceneNode::new(name, transform, mesh))
    }

    /// Add a node under `parent`; `None` if the parent no longer exists
    pub fn add_child(
        &mut self,
        parent: NodeKey,
        name: impl Into<String>,
        transform: Transform,
        mesh: Option<MeshData>,
    ) -> Option<NodeKey> {
        if !self.nodes.contains_key(parent) {
            log::warn!("add_child: parent {:?} not in scene", parent);
            return None;
        }
        let mut node = SceneNode::new(name, transform, mesh);
        node.parent = Some(parent);
        let key = self.nodes.insert(node);
        self.nodes[parent].children.push(key);
        Some(key)
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, key: NodeKey) -> bool {
        let Some(parent) = self.nodes.get(key).map(SceneNode::parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&c| c != key);
        }
        for node in self.subtree(key) {
            self.nodes.remove(node);
        }
        true
    }

    /// Check whether a handle is still live
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Borrow a node
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.nodes.iter().find(|(_, n)| n.name == name).map(|(k, _)| k)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the scene holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Set a node's local position
    pub fn set_position(&mut self, key: NodeKey, position: Vec3) -> bool {
        self.with_transform(key, |t| t.position = position)
    }

    /// Offset a node's local position
    pub fn translate(&mut self, key: NodeKey, delta: Vec3) -> bool {
        self.with_transform(key, |t| t.position += delta)
    }

    /// Set a node's local rotation
    pub fn set_rotation(&mut self, key: NodeKey, rotation: Quat) -> bool {
        self.with_transform(key, |t| t.rotation = rotation)
    }

    /// Set a node's local scale
    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) -> bool {
        self.with_transform(key, |t| t.scale = scale)
    }

    fn with_transform(&mut self, key: NodeKey, f: impl FnOnce(&mut Transform)) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                f(&mut node.transform);
                true
            }
            None => false,
        }
    }

    /// Accumulated transform from the node up through every ancestor
    pub fn world_matrix(&self, key: NodeKey) -> Option<Mat4> {
        let mut node = self.nodes.get(key)?;
        let mut matrix = node.transform.to_matrix();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            matrix = parent.transform.to_matrix() * matrix;
            node = parent;
        }
        Some(matrix)
    }

    /// World-space origin of a node
    pub fn world_position(&self, key: NodeKey) -> Option<Vec3> {
        self.world_matrix(key)
            .map(|m| m.transform_point(&Point3::origin()).coords)
    }

    /// World-space bounds of every mesh vertex under the node
    pub fn world_aabb(&self, key: NodeKey) -> Option<AABB> {
        AABB::from_points(self.world_vertices(key)?)
    }

    /// The node and all its descendants, parents before children
    pub fn subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else { continue };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}

impl MeshSource for SceneGraph {
    type Node = NodeKey;

    fn contains_node(&self, node: NodeKey) -> bool {
        self.contains(node)
    }

    fn node_label(&self, node: NodeKey) -> String {
        self.nodes
            .get(node)
            .map_or_else(|| format!("{node:?}"), |n| n.name.clone())
    }

    fn world_vertices(&self, node: NodeKey) -> Option<Vec<Vec3>> {
        let root_matrix = self.world_matrix(node)?;
        let mut vertices = Vec::new();
        let mut stack = vec![(node, root_matrix)];

        while let Some((key, matrix)) = stack.pop() {
            let Some(current) = self.nodes.get(key) else { continue };
            if let Some(mesh) = &current.mesh {
                vertices.extend(
                    mesh.positions
                        .iter()
                        .map(|p| matrix.transform_point(&Point3::from(*p)).coords),
                );
            }
            for &child in &current.children {
                if let Some(child_node) = self.nodes.get(child) {
                    stack.push((child, matrix * child_node.transform.to_matrix()));
                }
            }
        }

        Some(vertices)
    }
}

impl MovableSource for SceneGraph {
    fn translate_node(&mut self, node: NodeKey, delta: Vec3) -> bool {
        self.translate(node, delta)
    }
}
