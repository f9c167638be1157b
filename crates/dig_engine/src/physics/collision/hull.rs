//! Convex hull construction (Andrew's monotone chain)

use std::cmp::Ordering;

use crate::foundation::math::Point2;
use super::primitives::cross2;

/// Points closer than this in both coordinates are treated as one
const DUPLICATE_EPSILON: f32 = 1e-6;

/// Convex hull of an unordered point set, counterclockwise
///
/// Points are sorted by x then y and near-duplicates dropped. Collinear
/// boundary points are excluded (a turn with cross product `<= 0` is
/// popped) since they add no edges that matter for collision. Non-finite
/// points are discarded.
///
/// Fewer than 3 distinct points come back as they are after
/// deduplication, and an all-collinear input yields its two extremes, so
/// callers must treat a result shorter than 3 as "no hull".
///
/// The result does not repeat its first point and starts at the
/// lowest-x (then lowest-y) vertex, which makes it independent of input
/// order and makes the function idempotent.
pub fn convex_hull(mut points: Vec<Point2>) -> Vec<Point2> {
    points.retain(|p| p.x.is_finite() && p.y.is_finite());
    points.sort_by(|a, b| match a.x.total_cmp(&b.x) {
        Ordering::Equal => a.y.total_cmp(&b.y),
        other => other,
    });
    points.dedup_by(|a, b| {
        (a.x - b.x).abs() < DUPLICATE_EPSILON && (a.y - b.y).abs() < DUPLICATE_EPSILON
    });

    if points.len() < 3 {
        return points;
    }

    let mut lower: Vec<Point2> = Vec::with_capacity(points.len());
    for &p in &points {
        push_with_left_turn(&mut lower, p);
    }
    let mut upper: Vec<Point2> = Vec::with_capacity(points.len());
    for &p in points.iter().rev() {
        push_with_left_turn(&mut upper, p);
    }

    // Each chain ends where the other begins
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn push_with_left_turn(chain: &mut Vec<Point2>, p: Point2) {
    while chain.len() >= 2 && cross2(chain[chain.len() - 2], chain[chain.len() - 1], p) <= 0.0 {
        chain.pop();
    }
    chain.push(p);
}

/// Signed area of a closed polygon; positive when counterclockwise
pub fn signed_area(polygon: &[Point2]) -> f32 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice * 0.5
}
