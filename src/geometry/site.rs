use crate::math::distance_2d::{closest_point_on_segment, point_to_segment_dist, project_onto_line};
use crate::math::Point2;

slotmap::new_key_type! {
    /// Unique identifier for a site owned by a diagram.
    pub struct SiteId;
}

/// A line-segment site between two existing point sites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
    /// Point site located at `start`.
    pub start_site: SiteId,
    /// Point site located at `end`.
    pub end_site: SiteId,
}

impl Segment {
    /// Projection parameter of `x` onto the supporting line (`0` at `start`,
    /// `1` at `end`).
    #[must_use]
    pub fn parameter(&self, x: &Point2) -> f64 {
        project_onto_line(x, &self.start, &self.end)
    }

    /// Returns `true` if the segment joins `a` and `b`, in either order.
    #[must_use]
    pub fn connects(&self, a: SiteId, b: SiteId) -> bool {
        (self.start_site == a && self.end_site == b) || (self.start_site == b && self.end_site == a)
    }
}

/// A generator of the diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Site {
    Point(Point2),
    Segment(Segment),
}

impl Site {
    /// Euclidean distance from `x` to the site (clamped to the segment for
    /// segment sites).
    #[must_use]
    pub fn distance(&self, x: &Point2) -> f64 {
        match self {
            Self::Point(p) => (x - p).norm(),
            Self::Segment(s) => point_to_segment_dist(x, &s.start, &s.end),
        }
    }

    /// Point of the site nearest to `x`.
    #[must_use]
    pub fn closest_point(&self, x: &Point2) -> Point2 {
        match self {
            Self::Point(p) => *p,
            Self::Segment(s) => closest_point_on_segment(x, &s.start, &s.end),
        }
    }

    /// In-circle value of a vertex at `x` with the given clearance.
    ///
    /// Negative means the site is strictly closer to `x` than the vertex's
    /// current generators, i.e. the vertex is in conflict. For segments only
    /// the open slab perpendicular to the segment can be in conflict; outside
    /// it the value is clamped to be non-negative.
    #[must_use]
    pub fn in_circle(&self, x: &Point2, clearance: f64) -> f64 {
        match self {
            Self::Point(p) => (x - p).norm() - clearance,
            Self::Segment(s) => {
                let t = s.parameter(x);
                let value = self.distance(x) - clearance;
                if t > 0.0 && t < 1.0 {
                    value
                } else {
                    value.max(0.0)
                }
            }
        }
    }

    /// Returns the position if this is a point site.
    #[must_use]
    pub fn as_point(&self) -> Option<&Point2> {
        match self {
            Self::Point(p) => Some(p),
            Self::Segment(_) => None,
        }
    }

    /// Returns the segment if this is a segment site.
    #[must_use]
    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Self::Point(_) => None,
            Self::Segment(s) => Some(s),
        }
    }

    #[must_use]
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    const TOL: f64 = 1e-12;

    fn segment(a: Point2, b: Point2) -> Site {
        let mut ids: SlotMap<SiteId, ()> = SlotMap::with_key();
        Site::Segment(Segment {
            start: a,
            end: b,
            start_site: ids.insert(()),
            end_site: ids.insert(()),
        })
    }

    #[test]
    fn point_in_circle_sign() {
        let s = Site::Point(Point2::new(1.0, 0.0));
        // Vertex at origin with clearance 2: site at distance 1 is inside.
        assert!(s.in_circle(&Point2::origin(), 2.0) < 0.0);
        assert!(s.in_circle(&Point2::origin(), 0.5) > 0.0);
        assert!((s.in_circle(&Point2::origin(), 1.0)).abs() < TOL);
    }

    #[test]
    fn segment_distance_is_clamped() {
        let s = segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert!((s.distance(&Point2::new(2.0, 3.0)) - 3.0).abs() < TOL);
        assert!((s.distance(&Point2::new(7.0, 4.0)) - 5.0).abs() < TOL);
    }

    #[test]
    fn segment_in_circle_inside_slab() {
        let s = segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let v = s.in_circle(&Point2::new(2.0, 3.0), 5.0);
        assert!((v + 2.0).abs() < TOL, "v={v}");
    }

    #[test]
    fn segment_in_circle_outside_slab_never_negative() {
        let s = segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        // Beyond the end: distance 5 to the endpoint, clearance 6.
        let v = s.in_circle(&Point2::new(7.0, 4.0), 6.0);
        assert!(v.abs() < TOL, "v={v}");
        let w = s.in_circle(&Point2::new(7.0, 4.0), 1.0);
        assert!((w - 4.0).abs() < TOL, "w={w}");
    }
}
