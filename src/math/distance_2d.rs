use super::Point2;

/// Returns the parameter of the projection of `p` onto the infinite line
/// through `a` and `b`, where `0` is `a` and `1` is `b`.
///
/// A degenerate segment projects everything onto `a`.
#[must_use]
pub fn project_onto_line(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < 1e-20 {
        return 0.0;
    }
    (p - a).dot(&d) / len_sq
}

/// Returns the closest point to `p` on the segment from `a` to `b`.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let t = project_onto_line(p, a, b).clamp(0.0, 1.0);
    a + (b - a) * t
}

/// Returns the minimum distance from `p` to the segment from `a` to `b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    (p - closest_point_on_segment(p, a, b)).norm()
}
