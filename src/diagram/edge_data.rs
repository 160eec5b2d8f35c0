use crate::error::TopologyError;
use crate::topology::{EdgeId, FaceId, VertexStatus};

use super::VoronoiDiagram;

/// One contiguous run of IN vertices on a face boundary.
///
/// `enter` runs from an OUT vertex into the run and `exit` from the run to
/// an OUT vertex; both lie in `face`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeData {
    pub enter: EdgeId,
    pub exit: EdgeId,
    pub face: FaceId,
}

impl VoronoiDiagram {
    /// Walks the boundary of `f` and returns its IN runs in cycle order.
    ///
    /// # Errors
    ///
    /// [`TopologyError::FaceFullyInvaded`] if no boundary vertex of `f`
    /// survives the insertion.
    pub(super) fn find_edge_data(&self, f: FaceId) -> Result<Vec<EdgeData>, TopologyError> {
        let cycle = self.graph.face_edges(f)?;
        let is_in = |e: EdgeId| -> Result<bool, TopologyError> {
            Ok(self.graph.vertex(self.graph.edge(e)?.origin)?.status == VertexStatus::In)
        };

        let mut start = None;
        for (i, &e) in cycle.iter().enumerate() {
            if !is_in(e)? {
                start = Some(i);
                break;
            }
        }
        let Some(start) = start else {
            return Err(TopologyError::FaceFullyInvaded(f));
        };

        let mut runs = Vec::new();
        let mut enter = None;
        for k in 0..cycle.len() {
            let e = cycle[(start + k) % cycle.len()];
            let from_in = is_in(e)?;
            let to_in = self.graph.vertex(self.graph.target(e)?)?.status == VertexStatus::In;
            match (from_in, to_in) {
                (false, true) => enter = Some(e),
                (true, false) => {
                    let enter = enter.take().ok_or_else(|| {
                        TopologyError::InvalidTopology(format!("IN run in face {f:?} has no entry"))
                    })?;
                    runs.push(EdgeData { enter, exit: e, face: f });
                }
                _ => {}
            }
        }
        Ok(runs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::{VertexId, VertexKind};

    fn set_in(d: &mut VoronoiDiagram, vertices: &[VertexId]) {
        for &v in vertices {
            d.graph.vertex_mut(v).unwrap().status = VertexStatus::In;
            d.scratch.modified.push(v);
        }
    }

    fn center(d: &VoronoiDiagram) -> VertexId {
        d.graph()
            .vertices()
            .find(|(_, v)| v.kind == VertexKind::Normal)
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn face_without_in_vertices_has_no_runs() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let f = d.face_of(d.generators[0]).unwrap();
        assert!(d.find_edge_data(f).unwrap().is_empty());
    }

    #[test]
    fn single_run_enters_and_exits_around_the_centre() {
        let mut d = VoronoiDiagram::new(1.0, 4).unwrap();
        let c = center(&d);
        set_in(&mut d, &[c]);
        for g in d.generators {
            let f = d.face_of(g).unwrap();
            let runs = d.find_edge_data(f).unwrap();
            assert_eq!(runs.len(), 1);
            let run = runs[0];
            assert_eq!(run.face, f);
            assert_eq!(d.graph.target(run.enter).unwrap(), c);
            assert_eq!(d.graph.edge(run.exit).unwrap().origin, c);
            assert_eq!(d.graph.edge(run.enter).unwrap().next, run.exit);
        }
        d.reset_status();
    }

    #[test]
    fn separate_in_vertices_form_separate_runs() {
        let mut d = VoronoiDiagram::new(1.0, 4).unwrap();
        let f = d.face_of(d.generators[0]).unwrap();
        // Cycle: centre, apex, outer, outer, apex. The two apexes are
        // separated by the outer corners on one side and the centre on the
        // other.
        let apexes: Vec<VertexId> = d
            .graph
            .face_vertices(f)
            .unwrap()
            .into_iter()
            .filter(|&v| d.graph.vertex(v).unwrap().kind == VertexKind::Apex)
            .collect();
        assert_eq!(apexes.len(), 2);
        set_in(&mut d, &apexes);
        let runs = d.find_edge_data(f).unwrap();
        assert_eq!(runs.len(), 2);
        assert_ne!(runs[0].enter, runs[1].enter);
        d.reset_status();
    }

    #[test]
    fn fully_invaded_face_is_reported() {
        let mut d = VoronoiDiagram::new(1.0, 4).unwrap();
        let f = d.face_of(d.generators[1]).unwrap();
        let all = d.graph.face_vertices(f).unwrap();
        set_in(&mut d, &all);
        assert!(matches!(d.find_edge_data(f), Err(TopologyError::FaceFullyInvaded(face)) if face == f));
        d.reset_status();
    }
}
