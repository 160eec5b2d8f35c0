use crate::error::NumericError;
use crate::geometry::{EdgeCurve, Site};
use crate::math::root::{find_root, Bracket, RootOptions};
use crate::math::Point2;

use super::checker::CLEARANCE_TOLERANCE;

/// Distance a vertex may sit beyond a segment's separator line, relative to
/// its clearance.
const SLAB_TOLERANCE: f64 = 1e-4;

/// Locates the new vertex on an edge that runs from an OUT vertex to an IN
/// vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Positioner {
    options: RootOptions,
}

/// Position and clearance of a vertex to be created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point2,
    pub clearance: f64,
}

impl Placement {
    /// Checks that the vertex is `clearance` away from each of `sites` and
    /// inside the slab of every segment among them.
    ///
    /// # Errors
    ///
    /// [`NumericError::OutsideSlab`] or [`NumericError::OffBisector`] for the
    /// first site the vertex does not fit.
    pub fn verify(&self, sites: &[&Site]) -> Result<(), NumericError> {
        let scale = self.clearance.max(1.0);
        let (x, y) = (self.position.x, self.position.y);
        for site in sites {
            if let Site::Segment(s) = site {
                let t = s.parameter(&self.position);
                let overshoot = (-t).max(t - 1.0) * (s.end - s.start).norm();
                if overshoot > SLAB_TOLERANCE * scale {
                    return Err(NumericError::OutsideSlab { x, y });
                }
            }
            let deviation = (site.distance(&self.position) - self.clearance).abs();
            if deviation > CLEARANCE_TOLERANCE * scale {
                return Err(NumericError::OffBisector { x, y, deviation });
            }
        }
        Ok(())
    }
}

impl Positioner {
    #[must_use]
    pub fn new(options: RootOptions) -> Self {
        Self { options }
    }

    /// Finds the point of `curve` equidistant from `face_site` and the new
    /// `site`.
    ///
    /// `det_out` and `det_in` are the in-circle values already computed for
    /// the curve's start (OUT) and end (IN) vertices.
    ///
    /// # Errors
    ///
    /// Returns a [`NumericError`] if the values do not bracket a sign change
    /// or the root search does not converge.
    pub fn position(
        &self,
        curve: &EdgeCurve,
        face_site: &Site,
        site: &Site,
        det_out: f64,
        det_in: f64,
    ) -> Result<Placement, NumericError> {
        let g = |t: f64| {
            let x = curve.point(t);
            site.in_circle(&x, face_site.distance(&x))
        };
        let bracket = Bracket {
            lo: 0.0,
            hi: 1.0,
            f_lo: det_out,
            f_hi: det_in,
        };
        let t = find_root(g, bracket, self.options)?;
        let position = curve.point(t);
        Ok(Placement {
            position,
            clearance: face_site.distance(&position),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Segment, SiteId};
    use approx::assert_abs_diff_eq;

    #[test]
    fn places_vertex_where_new_site_is_equidistant() {
        // Bisector of (-1, 0) and (1, 0) from (0, 10) down to (0, -1.5).
        let a = Site::Point(Point2::new(-1.0, 0.0));
        let b = Site::Point(Point2::new(1.0, 0.0));
        let curve = EdgeCurve::between(Some(&a), Some(&b), Point2::new(0.0, 10.0), Point2::new(0.0, -1.5));
        let new_site = Site::Point(Point2::new(0.0, -2.0));

        let at = |t: f64| {
            let x = curve.point(t);
            new_site.in_circle(&x, a.distance(&x))
        };
        let placement = Positioner::default()
            .position(&curve, &a, &new_site, at(0.0), at(1.0))
            .unwrap();

        // Equidistant from (-1, 0) and (0, -2) on x = 0: y = -3/4.
        assert_abs_diff_eq!(placement.position.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(placement.position.y, -0.75, epsilon = 1e-9);
        assert_abs_diff_eq!(placement.clearance, 1.25, epsilon = 1e-9);
    }

    #[test]
    fn stops_at_the_separator_of_a_segment() {
        // Edge between the faces of g = (2, 0) and e = (0, 0) on x = 1. The
        // segment from e down to (0, -1) is clamped to e above y = 0, where
        // its in-circle value is exactly zero.
        let g = Site::Point(Point2::new(2.0, 0.0));
        let e = Site::Point(Point2::origin());
        let segment = Site::Segment(Segment {
            start: Point2::origin(),
            end: Point2::new(0.0, -1.0),
            start_site: SiteId::default(),
            end_site: SiteId::default(),
        });
        let curve = EdgeCurve::between(Some(&g), Some(&e), Point2::new(1.0, 2.0), Point2::new(1.0, -0.5));
        let at = |t: f64| {
            let x = curve.point(t);
            segment.in_circle(&x, g.distance(&x))
        };
        assert_eq!(at(0.5), 0.0);

        let placement = Positioner::default()
            .position(&curve, &g, &segment, at(0.0), at(1.0))
            .unwrap();
        assert_abs_diff_eq!(placement.position.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(placement.position.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(placement.clearance, 1.0, epsilon = 1e-9);
        placement.verify(&[&g, &e, &segment]).unwrap();
    }

    #[test]
    fn verify_rejects_vertices_off_the_bisector_or_slab() {
        let a = Site::Point(Point2::new(-1.0, 0.0));
        let b = Site::Point(Point2::new(1.0, 0.0));
        let segment = Site::Segment(Segment {
            start: Point2::new(-1.0, -1.0),
            end: Point2::new(1.0, -1.0),
            start_site: SiteId::default(),
            end_site: SiteId::default(),
        });
        let on = Placement {
            position: Point2::new(0.0, 0.0),
            clearance: 1.0,
        };
        on.verify(&[&a, &b, &segment]).unwrap();

        let off = Placement {
            position: Point2::new(0.1, 0.0),
            clearance: 1.1,
        };
        assert!(matches!(off.verify(&[&a, &b]), Err(NumericError::OffBisector { .. })));

        // Equidistant from the clamped segment, but beyond its end.
        let beyond = Placement {
            position: Point2::new(2.0, 0.0),
            clearance: 2.0_f64.sqrt(),
        };
        assert!(matches!(beyond.verify(&[&segment]), Err(NumericError::OutsideSlab { .. })));
    }

    #[test]
    fn rejects_values_without_sign_change() {
        let a = Site::Point(Point2::new(-1.0, 0.0));
        let b = Site::Point(Point2::new(1.0, 0.0));
        let curve = EdgeCurve::between(Some(&a), Some(&b), Point2::new(0.0, 10.0), Point2::new(0.0, 5.0));
        let new_site = Site::Point(Point2::new(0.0, -2.0));
        let err = Positioner::default()
            .position(&curve, &a, &new_site, 1.0, 2.0)
            .unwrap_err();
        assert!(matches!(err, NumericError::NoSignChange { .. }));
    }
}
