//! Split vertices for segment insertion.
//!
//! When a point face first becomes incident to a new segment, every bisector
//! of the face that crosses the face's split line is subdivided there. This
//! keeps each face's IN vertices contiguous even where the segment's
//! conflict region wraps around the point site.

use crate::error::InsertionError;
use crate::geometry::{Segment, Site};
use crate::math::predicates::signed_line_distance;
use crate::math::root::{find_root, Bracket, RootOptions};
use crate::math::Point2;
use crate::topology::{EdgeKind, FaceId, VertexKind, VertexStatus};

use super::{Placement, VoronoiDiagram};

impl VoronoiDiagram {
    /// Line through two points that splits the face of point site `p`.
    ///
    /// An endpoint of the segment is split by the segment's own line; any
    /// other point by the line to its closest point on the segment.
    fn split_line(p: &Point2, segment: &Segment, site: &Site) -> (Point2, Point2) {
        if p == &segment.start || p == &segment.end {
            (segment.start, segment.end)
        } else {
            (*p, site.closest_point(p))
        }
    }

    pub(super) fn add_split_vertices(
        &mut self,
        f: FaceId,
        segment: &Segment,
        site: &Site,
    ) -> Result<(), InsertionError> {
        let Some(&p) = self.face_site(f)?.and_then(Site::as_point) else {
            return Ok(());
        };
        let (p1, p2) = Self::split_line(&p, segment, site);
        let tol = self.tolerance();
        let mut added = 0usize;

        for e in self.graph.face_edges(f)? {
            if self.graph.edge(e)?.kind != EdgeKind::Bisector {
                continue;
            }
            let curve = self.edge_curve(e)?;
            let f_line = |t: f64| signed_line_distance(&curve.point(t), &p1, &p2);
            let bracket = Bracket::evaluate(f_line, 0.0, 1.0);
            if bracket.f_lo.abs() < tol || bracket.f_hi.abs() < tol || !bracket.has_sign_change() {
                continue;
            }
            let t = find_root(f_line, bracket, RootOptions::default())?;
            let position = curve.point(t);
            let placement = Placement {
                position,
                clearance: (position - p).norm(),
            };
            let twin_face = self.graph.edge(self.graph.edge(e)?.twin)?.face;
            if let Some(twin_site) = self.face_site(twin_face)? {
                placement.verify(&[twin_site])?;
            }

            let origin = self.graph.edge(e)?.origin;
            let target = self.graph.target(e)?;
            let v = self.new_vertex(placement.position, placement.clearance, VertexKind::Split);
            self.graph.split_edge(e, v)?;
            self.scratch.modified.push(v);
            added += 1;

            if self.graph.vertex(origin)?.status == VertexStatus::In
                || self.graph.vertex(target)?.status == VertexStatus::In
            {
                self.enqueue(v, site)?;
            }
        }
        if added > 0 {
            tracing::debug!(face = ?f, added, "inserted split vertices");
        }
        Ok(())
    }
}
