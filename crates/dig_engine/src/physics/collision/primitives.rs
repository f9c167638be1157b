//! Primitive 2D geometry on the XZ plane
//!
//! Points are [`Point2`] with `x` = world X and `y` = world Z.

use crate::foundation::math::{Point2, Vec2, Vec3};

/// Edges shorter than this have no usable normal
pub const DEGENERATE_EDGE_LENGTH: f32 = 1e-6;

/// 2D cross product of `OA x OB`
///
/// Positive when `o -> a -> b` turns counterclockwise, zero when collinear.
#[inline]
pub fn cross2(o: Point2, a: Point2, b: Point2) -> f32 {
    let oa = a - o;
    let ob = b - o;
    oa.x * ob.y - oa.y * ob.x
}

/// Unit outward normal of the edge `a -> b` of a counterclockwise polygon
///
/// For a CCW polygon the interior lies to the left of every edge, so the
/// outward normal is the edge rotated clockwise: `(e.y, -e.x)`.
/// Returns `None` for a degenerate edge.
#[inline]
pub fn edge_outward_normal(a: Point2, b: Point2) -> Option<Vec2> {
    let e = b - a;
    let normal = Vec2::new(e.y, -e.x);
    let len = normal.norm();
    if len <= DEGENERATE_EDGE_LENGTH {
        return None;
    }
    Some(normal / len)
}

/// Signed distance from `p` to the line through `a` with unit normal `normal`
///
/// Positive on the side the normal points to.
#[inline]
pub fn signed_edge_distance(normal: Vec2, a: Point2, p: Point2) -> f32 {
    normal.dot(&(p - a))
}

/// Oriented rectangle on the XZ plane where collision checks are suppressed
///
/// Used for doorways and gaps that the hull of a neighbouring obstacle would
/// otherwise close off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoCollisionZone {
    /// Center on the XZ plane
    pub center: Point2,
    /// Half extent along the zone's local right axis
    pub half_width: f32,
    /// Half extent along the zone's local forward axis
    pub half_depth: f32,
    /// Rotation about the vertical axis, radians
    pub yaw: f32,
}

impl NoCollisionZone {
    /// Create a zone; negative half extents are clamped to zero
    pub fn new(center_x: f32, center_z: f32, half_width: f32, half_depth: f32, yaw: f32) -> Self {
        Self {
            center: Point2::new(center_x, center_z),
            half_width: half_width.max(0.0),
            half_depth: half_depth.max(0.0),
            yaw,
        }
    }

    /// Create a zone from a world-space center; the Y component is ignored
    pub fn from_world(center: Vec3, half_width: f32, half_depth: f32, yaw: f32) -> Self {
        Self::new(center.x, center.z, half_width, half_depth, yaw)
    }

    /// Check whether `(x, z)` lies inside the rectangle (boundary included)
    pub fn contains(&self, x: f32, z: f32) -> bool {
        self.contains_expanded(x, z, 0.0, 0.0)
    }

    /// Same as [`contains`](Self::contains) with both half extents grown
    pub fn contains_expanded(&self, x: f32, z: f32, expand_width: f32, expand_depth: f32) -> bool {
        let (local_x, local_z) = self.to_local(x, z);
        local_x.abs() <= self.half_width + expand_width
            && local_z.abs() <= self.half_depth + expand_depth
    }

    /// Rotate a world point by `-yaw` into zone-local coordinates
    fn to_local(&self, x: f32, z: f32) -> (f32, f32) {
        let dx = x - self.center.x;
        let dz = z - self.center.y;
        let (s, c) = self.yaw.sin_cos();
        (c * dx + s * dz, -s * dx + c * dz)
    }

    /// The four corners in world XZ, counterclockwise
    pub fn corners(&self) -> [Point2; 4] {
        let (s, c) = self.yaw.sin_cos();
        // Inverse of `to_local`
        let to_world = |lx: f32, lz: f32| {
            Point2::new(self.center.x + c * lx - s * lz, self.center.y + s * lx + c * lz)
        };
        let (hw, hd) = (self.half_width, self.half_depth);
        [
            to_world(-hw, -hd),
            to_world(hw, -hd),
            to_world(hw, hd),
            to_world(-hw, hd),
        ]
    }
}
