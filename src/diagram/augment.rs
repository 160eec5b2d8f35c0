//! Growth of the IN-vertex set from a seed.

use crate::error::{InsertionError, TopologyError};
use crate::geometry::Site;
use crate::topology::{FaceId, FaceStatus, VertexId, VertexStatus};

use super::VoronoiDiagram;

/// Counters for the last vertex-set augmentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AugmentStats {
    /// Vertices whose in-circle value was computed.
    pub evaluated: usize,
    pub marked_in: usize,
    pub marked_out: usize,
}

impl VoronoiDiagram {
    /// Computes the in-circle value of `v` against `site` and queues it.
    pub(super) fn enqueue(&mut self, v: VertexId, site: &Site) -> Result<(), TopologyError> {
        let vertex = self.graph.vertex_mut(v)?;
        let det = site.in_circle(&vertex.position, vertex.clearance);
        vertex.det = det;
        vertex.in_queue = true;
        self.scratch.modified.push(v);
        self.scratch.queue.push(v, det);
        self.scratch.stats.evaluated += 1;
        Ok(())
    }

    /// Classifies queued vertices until the queue is empty.
    ///
    /// A vertex goes IN when it is in conflict with `site`, is not protected
    /// and has fewer than two IN neighbours; anything else goes OUT.
    pub(super) fn augment_vertex_set(&mut self, site: &Site) -> Result<(), InsertionError> {
        while let Some((v, det)) = self.scratch.queue.pop() {
            let vertex = self.graph.vertex(v)?;
            if vertex.status != VertexStatus::Undecided {
                continue;
            }
            let admissible = det < 0.0 && !vertex.is_protected() && self.in_neighbor_count(v)? < 2;
            if admissible {
                self.mark_in(v, site)?;
            } else {
                self.graph.vertex_mut(v)?.status = VertexStatus::Out;
                self.scratch.stats.marked_out += 1;
            }
        }
        tracing::debug!(
            marked_in = self.scratch.stats.marked_in,
            marked_out = self.scratch.stats.marked_out,
            "augmented vertex set"
        );
        Ok(())
    }

    fn in_neighbor_count(&self, v: VertexId) -> Result<usize, TopologyError> {
        let mut count = 0;
        for n in self.graph.neighbors(v)? {
            if self.graph.vertex(n)?.status == VertexStatus::In {
                count += 1;
            }
        }
        Ok(count)
    }

    fn mark_in(&mut self, v: VertexId, site: &Site) -> Result<(), InsertionError> {
        self.graph.vertex_mut(v)?.status = VertexStatus::In;
        self.scratch.in_vertices.push(v);
        self.scratch.stats.marked_in += 1;

        for f in self.graph.adjacent_faces(v)? {
            self.mark_face_incident(f, site)?;
        }
        // Split vertices added above are already queued.
        for n in self.graph.neighbors(v)? {
            let neighbor = self.graph.vertex(n)?;
            if neighbor.status == VertexStatus::Undecided && !neighbor.in_queue {
                self.enqueue(n, site)?;
            }
        }
        Ok(())
    }

    /// Flags `f` as touched by the insertion. For a segment site, a point
    /// face gets its split vertices the first time it is flagged.
    pub(super) fn mark_face_incident(&mut self, f: FaceId, site: &Site) -> Result<(), InsertionError> {
        if f == self.outer_face {
            return Ok(());
        }
        let face = self.graph.face_mut(f)?;
        if face.status == FaceStatus::Incident {
            return Ok(());
        }
        face.status = FaceStatus::Incident;
        self.scratch.incident_faces.push(f);

        if let Site::Segment(segment) = site {
            if self.face_site(f)?.is_some_and(Site::is_point) {
                self.add_split_vertices(f, segment, site)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::topology::VertexKind;

    fn center(d: &VoronoiDiagram) -> VertexId {
        d.graph()
            .vertices()
            .find(|(_, v)| v.kind == VertexKind::Normal)
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn grows_from_the_centre_of_the_initial_diagram() {
        let mut d = VoronoiDiagram::new(1.0, 4).unwrap();
        let site = Site::Point(Point2::origin());
        let c = center(&d);
        d.enqueue(c, &site).unwrap();
        d.augment_vertex_set(&site).unwrap();

        // Centre and the three apexes; the outer corners are protected.
        assert_eq!(d.scratch.stats.marked_in, 4);
        assert_eq!(d.scratch.stats.marked_out, 3);
        assert_eq!(d.scratch.incident_faces.len(), 3);
        assert!(!d.scratch.incident_faces.contains(&d.outer_face));
        d.reset_status();
    }

    #[test]
    fn vertex_out_of_conflict_stays_out() {
        let mut d = VoronoiDiagram::new(1.0, 4).unwrap();
        let c = center(&d);
        let distant = Site::Point(Point2::new(0.0, 100.0));
        d.enqueue(c, &distant).unwrap();
        d.augment_vertex_set(&distant).unwrap();
        assert_eq!(d.scratch.stats.marked_in, 0);
        assert_eq!(d.scratch.stats.marked_out, 1);
        assert_eq!(d.graph.vertex(c).unwrap().status, VertexStatus::Out);
        d.reset_status();
    }

    #[test]
    fn vertex_with_two_in_neighbours_goes_out() {
        let mut d = VoronoiDiagram::new(1.0, 4).unwrap();
        let site = Site::Point(Point2::origin());
        let c = center(&d);
        let apexes = d.graph.neighbors(c).unwrap();
        assert_eq!(apexes.len(), 3);
        for &a in &apexes[..2] {
            d.graph.vertex_mut(a).unwrap().status = VertexStatus::In;
            d.scratch.modified.push(a);
        }
        d.enqueue(c, &site).unwrap();
        d.augment_vertex_set(&site).unwrap();
        assert_eq!(d.graph.vertex(c).unwrap().status, VertexStatus::Out);
        d.reset_status();
    }
}
