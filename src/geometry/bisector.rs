use crate::math::distance_2d::{closest_point_on_segment, project_onto_line};
use crate::math::{lerp, perp, Point2, Vector2, TOLERANCE};

use super::site::{Segment, Site};

/// The geometric curve traced by an edge between two vertices.
///
/// Derived on demand from the sites of the two faces the edge separates and
/// the positions of its end vertices; nothing about the curve is stored in
/// the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeCurve {
    /// Line segment from `start` to `end`.
    ///
    /// `apex` is the point of minimum clearance on the supporting line,
    /// present only for point–point bisectors.
    Straight {
        start: Point2,
        end: Point2,
        apex: Option<Point2>,
    },
    /// Arc of the parabola equidistant from a point and a segment line.
    Parabola(ParabolaArc),
}

/// Arc of the parabola with a given focus and directrix.
///
/// A point on the parabola is written in a frame attached to the directrix:
/// `x(u) = foot + u·dir + ((u² + d²) / 2d)·normal`, where `foot` is the
/// projection of the focus onto the directrix, `normal` points towards the
/// focus and `d` is the focus distance. The apex is at `u = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParabolaArc {
    foot: Point2,
    dir: Vector2,
    normal: Vector2,
    d: f64,
    u_start: f64,
    u_end: f64,
}

impl ParabolaArc {
    fn new(focus: &Point2, segment: &Segment, start: &Point2, end: &Point2) -> Option<Self> {
        let along = segment.end - segment.start;
        let len = along.norm();
        if len < TOLERANCE {
            return None;
        }
        let dir = along / len;
        let mut normal = perp(&dir);
        let mut d = (focus - segment.start).dot(&normal);
        if d < 0.0 {
            normal = -normal;
            d = -d;
        }
        if d < TOLERANCE * len.max(1.0) {
            return None;
        }
        let foot = focus - normal * d;
        Some(Self {
            foot,
            dir,
            normal,
            d,
            u_start: (start - foot).dot(&dir),
            u_end: (end - foot).dot(&dir),
        })
    }

    fn at(&self, u: f64) -> Point2 {
        self.foot + self.dir * u + self.normal * ((u * u + self.d * self.d) / (2.0 * self.d))
    }

    /// The apex of the parabola.
    #[must_use]
    pub fn apex(&self) -> Point2 {
        self.at(0.0)
    }
}

impl EdgeCurve {
    /// Builds the curve of an edge separating faces generated by `a` and `b`.
    ///
    /// `None` stands for the unbounded outer face; its edges are straight.
    #[must_use]
    pub fn between(a: Option<&Site>, b: Option<&Site>, start: Point2, end: Point2) -> Self {
        let straight = |apex| Self::Straight { start, end, apex };
        match (a, b) {
            (Some(Site::Point(p)), Some(Site::Point(q))) => straight(Some(nalgebra::center(p, q))),
            (Some(Site::Point(p)), Some(Site::Segment(s)))
            | (Some(Site::Segment(s)), Some(Site::Point(p))) => {
                match ParabolaArc::new(p, s, &start, &end) {
                    Some(arc) => Self::Parabola(arc),
                    // The point lies on the segment line: a separator.
                    None => straight(None),
                }
            }
            _ => straight(None),
        }
    }

    /// Point at parameter `t ∈ [0, 1]`, from the start vertex to the end
    /// vertex.
    #[must_use]
    pub fn point(&self, t: f64) -> Point2 {
        match self {
            Self::Straight { start, end, .. } => lerp(start, end, t),
            Self::Parabola(arc) => arc.at(arc.u_start + (arc.u_end - arc.u_start) * t),
        }
    }

    /// Returns the apex if it lies strictly between the two end vertices.
    #[must_use]
    pub fn apex_on_edge(&self) -> Option<Point2> {
        match self {
            Self::Straight {
                start,
                end,
                apex: Some(apex),
            } => {
                let t = project_onto_line(apex, start, end);
                let on_line = (closest_point_on_segment(apex, start, end) - apex).norm();
                let interior = (apex - start).norm() > TOLERANCE && (apex - end).norm() > TOLERANCE;
                (t > 0.0 && t < 1.0 && interior && on_line < TOLERANCE * (end - start).norm().max(1.0))
                    .then_some(*apex)
            }
            Self::Straight { apex: None, .. } => None,
            Self::Parabola(arc) => {
                let tol = TOLERANCE * arc.d.max(1.0);
                let spans = (arc.u_start < -tol && arc.u_end > tol) || (arc.u_start > tol && arc.u_end < -tol);
                spans.then(|| arc.apex())
            }
        }
    }
}
