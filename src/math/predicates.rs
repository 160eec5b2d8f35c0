//! Orientation and signed-distance predicates.
//!
//! All predicates are plain `f64` evaluations; callers only look at the sign
//! and the magnitude of the returned value.

use super::{Point2, Vector2};

/// 2D cross product `a × b`.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of triangle `abc`.
///
/// Positive when `c` lies to the left of the directed line `a → b`.
#[must_use]
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    cross(&(b - a), &(c - a))
}

/// Signed perpendicular distance from `p` to the infinite line through
/// `a` and `b`: positive to the right of `a → b`, negative to the left.
///
/// Returns `0.0` for a degenerate line.
#[must_use]
pub fn signed_line_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let len = (b - a).norm();
    if len == 0.0 {
        return 0.0;
    }
    -orient2d(a, b, p) / len
}

/// Center of the circle through `a`, `b` and `c`, or `None` when the points
/// are collinear.
#[must_use]
pub fn circumcenter(a: &Point2, b: &Point2, c: &Point2) -> Option<Point2> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * cross(&ab, &ac);
    if d.abs() < f64::EPSILON * ab.norm_squared().max(ac.norm_squared()) {
        return None;
    }
    let ab2 = ab.norm_squared();
    let ac2 = ac.norm_squared();
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    Some(Point2::new(a.x + ux, a.y + uy))
}
