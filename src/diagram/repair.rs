//! Commit step of an insertion: new face, new vertices and edges, removal of
//! the IN tree.
//!
//! Everything here works from data captured before the first deletion, so
//! the order is fixed: split every entering edge, collect the doomed
//! half-edges, link one chain per run, then delete.

use std::collections::{HashMap, HashSet};

use crate::error::TopologyError;
use crate::geometry::{Site, SiteId};
use crate::math::Point2;
use crate::topology::{EdgeId, EdgeKind, FaceData, FaceId, VertexId, VertexKind, VertexStatus};

use super::insert::InsertionPlan;
use super::VoronoiDiagram;

fn invalid(msg: String) -> TopologyError {
    TopologyError::InvalidTopology(msg)
}

impl VoronoiDiagram {
    /// Applies `plan` for the already registered site `site_id` and returns
    /// the site's new face.
    pub(super) fn commit(&mut self, site_id: SiteId, plan: &InsertionPlan) -> Result<FaceId, TopologyError> {
        let site = *self.sites.get(site_id).ok_or(TopologyError::EntityNotFound("site"))?;
        let endpoints: Vec<(FaceId, Point2)> = match site {
            Site::Segment(s) => vec![
                (self.face_of_site(s.start_site)?, s.start),
                (self.face_of_site(s.end_site)?, s.end),
            ],
            Site::Point(_) => Vec::new(),
        };
        let endpoint_in = |f: FaceId| endpoints.iter().find(|(ef, _)| *ef == f).map(|(_, p)| *p);

        let new_face = self.graph.add_face(FaceData::new(Some(site_id)));

        // --- New vertices on the entering edges ---
        for (run, placement) in plan.runs.iter().zip(&plan.placements) {
            let twin_face = self.graph.edge(self.graph.edge(run.enter)?.twin)?.face;
            let kind = if endpoint_in(run.face).is_some() || endpoint_in(twin_face).is_some() {
                VertexKind::Separator
            } else {
                VertexKind::Normal
            };
            let x = self.new_vertex(placement.position, placement.clearance, kind);
            self.graph.vertex_mut(x)?.status = VertexStatus::New;
            self.scratch.modified.push(x);
            self.graph.split_edge(run.enter, x)?;
        }

        let mut doomed = HashSet::new();
        for &v in &self.scratch.in_vertices {
            for e in self.graph.out_edges(v)? {
                doomed.insert(e);
                doomed.insert(self.graph.edge(e)?.twin);
            }
        }

        // --- One chain per run ---
        let mut chain_start: HashMap<VertexId, EdgeId> = HashMap::new();
        let mut chain_ends: Vec<(EdgeId, VertexId)> = Vec::with_capacity(plan.runs.len());
        let mut bisectors = Vec::new();
        for run in &plan.runs {
            let x_enter = self.graph.target(run.enter)?;
            let x_exit = self.graph.target(run.exit)?;
            for x in [x_enter, x_exit] {
                if self.graph.vertex(x)?.status != VertexStatus::New {
                    return Err(invalid(format!(
                        "run in face {:?} does not end at a new vertex",
                        run.face
                    )));
                }
            }
            let after_exit = self.graph.edge(run.exit)?.next;

            let mut path = vec![x_enter];
            let kind = match endpoint_in(run.face) {
                Some(p) => {
                    let endpoint = self.new_vertex(p, 0.0, VertexKind::Endpoint);
                    self.graph.vertex_mut(endpoint)?.status = VertexStatus::New;
                    self.scratch.modified.push(endpoint);
                    path.push(endpoint);
                    EdgeKind::Separator
                }
                None => EdgeKind::Bisector,
            };
            path.push(x_exit);

            let mut inner = Vec::with_capacity(path.len() - 1);
            let mut outer = Vec::with_capacity(path.len() - 1);
            for w in path.windows(2) {
                let (i, o) = self.graph.add_twin_edges(w[0], w[1], run.face, new_face, kind)?;
                self.graph.vertex_mut(w[0])?.edge = i;
                inner.push(i);
                outer.push(o);
            }
            let (Some(&first_inner), Some(&last_inner)) = (inner.first(), inner.last()) else {
                return Err(invalid(format!("empty chain in face {:?}", run.face)));
            };
            let (Some(&first_outer), Some(&last_outer)) = (outer.first(), outer.last()) else {
                return Err(invalid(format!("empty chain in face {:?}", run.face)));
            };

            self.graph.set_next(run.enter, first_inner)?;
            for w in inner.windows(2) {
                self.graph.set_next(w[0], w[1])?;
            }
            self.graph.set_next(last_inner, after_exit)?;
            // The new face sees the chain backwards.
            for w in outer.windows(2) {
                self.graph.set_next(w[1], w[0])?;
            }
            self.graph.face_mut(run.face)?.edge = first_inner;

            chain_start.insert(x_exit, last_outer);
            chain_ends.push((first_outer, x_enter));
            if kind == EdgeKind::Bisector {
                bisectors.extend(inner);
            }
        }

        let mut face_edge = None;
        for (end, x_enter) in chain_ends {
            let start = chain_start
                .get(&x_enter)
                .copied()
                .ok_or_else(|| invalid(format!("no chain of the new face starts at {x_enter:?}")))?;
            self.graph.set_next(end, start)?;
            face_edge.get_or_insert(start);
        }
        self.graph.face_mut(new_face)?.edge =
            face_edge.ok_or_else(|| invalid("new face has an empty boundary".to_string()))?;

        // --- Removal ---
        for e in doomed {
            self.graph.remove_edge(e);
        }
        let removed = std::mem::take(&mut self.scratch.in_vertices);
        for &v in &removed {
            self.graph.remove_vertex(v);
        }

        // --- Clearance minima on the new bisectors ---
        for e in bisectors {
            let Some(apex) = self.edge_curve(e)?.apex_on_edge() else {
                continue;
            };
            let v = self.new_vertex(apex, site.distance(&apex), VertexKind::Apex);
            self.graph.vertex_mut(v)?.status = VertexStatus::New;
            self.scratch.modified.push(v);
            self.graph.split_edge(e, v)?;
        }

        tracing::debug!(
            face = ?new_face,
            runs = plan.runs.len(),
            removed = removed.len(),
            "committed new face"
        );
        Ok(new_face)
    }
}
