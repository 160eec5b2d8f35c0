use super::predicates::orient2d;
use super::{Point2, TOLERANCE};

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are the parameters
/// on the two segments, both in `[0, 1]`. Parallel segments return `None`;
/// use [`segments_touch`] when collinear overlap matters.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        let pt = a0 + da * t_clamped;
        Some((pt, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Returns `true` if the closed segments `a0-a1` and `b0-b1` share at least
/// one point, including touching endpoints and collinear overlap.
#[must_use]
pub fn segments_touch(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> bool {
    if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
        return true;
    }
    let scale = (a1 - a0).norm().max((b1 - b0).norm()).max(1.0);
    let collinear = orient2d(a0, a1, b0).abs() <= TOLERANCE * scale * scale
        && orient2d(a0, a1, b1).abs() <= TOLERANCE * scale * scale;
    if !collinear {
        return false;
    }
    // Collinear: compare extents along the dominant axis.
    let along_x = (a1.x - a0.x).abs() >= (a1.y - a0.y).abs();
    let key = |p: &Point2| if along_x { p.x } else { p.y };
    let (a_min, a_max) = min_max(key(a0), key(a1));
    let (b_min, b_max) = min_max(key(b0), key(b1));
    a_min <= b_max + TOLERANCE && b_min <= a_max + TOLERANCE
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn crossing_segments() {
        let r = segment_segment_intersect_2d(&p(0.0, 0.0), &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0));
        let (pt, t, u) = r.unwrap_or_else(|| panic!("expected intersection"));
        assert!((pt.x - 1.0).abs() < 1e-12 && (pt.y - 1.0).abs() < 1e-12);
        assert!((t - 0.5).abs() < 1e-12 && (u - 0.5).abs() < 1e-12);
    }

    #[test]
    fn disjoint_segments() {
        assert!(!segments_touch(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0), &p(1.0, 1.0)));
        assert!(!segments_touch(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, -1.0), &p(2.0, 1.0)));
    }

    #[test]
    fn shared_endpoint_touches() {
        assert!(segments_touch(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 0.0), &p(1.0, 5.0)));
    }

    #[test]
    fn collinear_overlap_and_gap() {
        assert!(segments_touch(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 0.0), &p(3.0, 0.0)));
        assert!(!segments_touch(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0), &p(3.0, 0.0)));
    }
}
