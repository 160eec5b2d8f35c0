//! Admissibility of the IN-vertex set and full structural validation.

use std::collections::{HashSet, VecDeque};

use slotmap::SlotMap;

use crate::error::TopologyError;
use crate::geometry::{Site, SiteId};
use crate::topology::{FaceStatus, HalfEdgeGraph, VertexId, VertexStatus};

/// Relative tolerance for vertex clearances.
pub(crate) const CLEARANCE_TOLERANCE: f64 = 1e-6;

/// Verifies that the IN vertices form a non-empty tree in the graph.
///
/// # Errors
///
/// Returns [`TopologyError::EmptyInSet`], [`TopologyError::DisconnectedInSet`]
/// or [`TopologyError::CyclicInSet`] when the set is not a tree.
pub fn check_in_set(graph: &HalfEdgeGraph, in_vertices: &[VertexId]) -> Result<(), TopologyError> {
    let Some(&seed) = in_vertices.first() else {
        return Err(TopologyError::EmptyInSet);
    };

    let mut in_edges = 0usize;
    for &v in in_vertices {
        for n in graph.neighbors(v)? {
            if graph.vertex(n)?.status == VertexStatus::In {
                in_edges += 1;
            }
        }
    }
    // Each IN-IN edge was seen from both ends.
    in_edges /= 2;

    let mut reached = HashSet::from([seed]);
    let mut queue = VecDeque::from([seed]);
    while let Some(v) = queue.pop_front() {
        for n in graph.neighbors(v)? {
            if graph.vertex(n)?.status == VertexStatus::In && reached.insert(n) {
                queue.push_back(n);
            }
        }
    }
    if reached.len() != in_vertices.len() {
        return Err(TopologyError::DisconnectedInSet {
            reached: reached.len(),
            total: in_vertices.len(),
        });
    }
    if in_edges + 1 != in_vertices.len() {
        return Err(TopologyError::CyclicInSet {
            vertices: in_vertices.len(),
            edges: in_edges,
        });
    }
    Ok(())
}

/// Full validation of a diagram at rest.
///
/// Checks half-edge linkage, that face cycles partition the half-edges,
/// vertex degrees, the Euler relation, baseline transient status, and that
/// every vertex is equidistant from the sites of the faces around it.
///
/// # Errors
///
/// Returns [`TopologyError::InvalidTopology`] describing the first failure,
/// or [`TopologyError::EntityNotFound`] for a dangling reference.
pub fn validate(graph: &HalfEdgeGraph, sites: &SlotMap<SiteId, Site>) -> Result<(), TopologyError> {
    check_links(graph)?;
    check_faces(graph)?;
    check_vertices(graph, sites)?;

    let (v, e, f) = (graph.num_vertices(), graph.num_edges(), graph.num_faces());
    if v + f != e + 2 {
        return Err(invalid(format!("Euler relation fails: V={v} E={e} F={f}")));
    }
    Ok(())
}

fn invalid(msg: String) -> TopologyError {
    TopologyError::InvalidTopology(msg)
}

fn check_links(graph: &HalfEdgeGraph) -> Result<(), TopologyError> {
    if graph.num_half_edges() % 2 != 0 {
        return Err(invalid("odd number of half-edges".to_string()));
    }
    for (id, e) in graph.edges() {
        let twin = graph.edge(e.twin)?;
        if e.twin == id || twin.twin != id {
            return Err(invalid(format!("half-edge {id:?} has an asymmetric twin")));
        }
        if twin.kind != e.kind {
            return Err(invalid(format!("half-edge {id:?} and its twin differ in kind")));
        }
        let next = graph.edge(e.next)?;
        if next.prev != id {
            return Err(invalid(format!("prev(next({id:?})) is not {id:?}")));
        }
        if graph.edge(e.prev)?.next != id {
            return Err(invalid(format!("next(prev({id:?})) is not {id:?}")));
        }
        if next.origin != twin.origin {
            return Err(invalid(format!("next({id:?}) does not start at its target")));
        }
        if next.face != e.face {
            return Err(invalid(format!("next({id:?}) lies in another face")));
        }
        graph.vertex(e.origin)?;
        graph.face(e.face)?;
    }
    Ok(())
}

fn check_faces(graph: &HalfEdgeGraph) -> Result<(), TopologyError> {
    let mut seen = HashSet::with_capacity(graph.num_half_edges());
    let mut outer = 0usize;
    for (fid, face) in graph.faces() {
        if face.status != FaceStatus::NonIncident {
            return Err(invalid(format!("face {fid:?} is still marked incident")));
        }
        if face.site.is_none() {
            outer += 1;
        }
        for e in graph.face_edges(fid)? {
            if graph.edge(e)?.face != fid {
                return Err(invalid(format!("half-edge {e:?} is on the boundary of {fid:?} but not in it")));
            }
            if !seen.insert(e) {
                return Err(invalid(format!("half-edge {e:?} is on two boundary cycles")));
            }
        }
    }
    if seen.len() != graph.num_half_edges() {
        return Err(invalid(format!(
            "{} half-edges are on no face cycle",
            graph.num_half_edges() - seen.len()
        )));
    }
    if outer != 1 {
        return Err(invalid(format!("{outer} faces without a site")));
    }
    Ok(())
}

fn check_vertices(graph: &HalfEdgeGraph, sites: &SlotMap<SiteId, Site>) -> Result<(), TopologyError> {
    for (vid, v) in graph.vertices() {
        if v.status != VertexStatus::Undecided || v.in_queue {
            return Err(invalid(format!("vertex {vid:?} has status {:?}", v.status)));
        }
        let out = graph.out_edges(vid)?;
        if out.len() < v.kind.min_degree() {
            return Err(invalid(format!(
                "{:?} vertex {vid:?} has degree {}",
                v.kind,
                out.len()
            )));
        }
        check_clearance(graph, sites, vid)?;
    }
    Ok(())
}

/// Checks the clearance of each listed vertex that is still in the graph
/// against the sites of the faces around it.
///
/// # Errors
///
/// Returns [`TopologyError::InvalidTopology`] for the first vertex whose
/// clearance differs from its distance to one of those sites.
pub fn check_clearances(
    graph: &HalfEdgeGraph,
    sites: &SlotMap<SiteId, Site>,
    vertices: &[VertexId],
) -> Result<(), TopologyError> {
    for &v in vertices {
        if graph.vertex(v).is_ok() {
            check_clearance(graph, sites, v)?;
        }
    }
    Ok(())
}

fn check_clearance(graph: &HalfEdgeGraph, sites: &SlotMap<SiteId, Site>, vid: VertexId) -> Result<(), TopologyError> {
    let v = graph.vertex(vid)?;
    for e in graph.out_edges(vid)? {
        let Some(site_id) = graph.face(graph.edge(e)?.face)?.site else {
            continue;
        };
        let site = sites.get(site_id).ok_or(TopologyError::EntityNotFound("site"))?;
        let d = site.distance(&v.position);
        if (d - v.clearance).abs() > CLEARANCE_TOLERANCE * v.clearance.max(1.0) {
            return Err(invalid(format!(
                "vertex {vid:?} at ({}, {}) has clearance {} but is {d} from site {site_id:?}",
                v.position.x, v.position.y, v.clearance
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diagram::VoronoiDiagram;
    use crate::math::Point2;
    use crate::topology::VertexKind;

    fn with_status(graph: &HalfEdgeGraph, vertices: &[VertexId]) -> HalfEdgeGraph {
        let mut g = graph.clone();
        for &v in vertices {
            g.vertex_mut(v).unwrap().status = VertexStatus::In;
        }
        g
    }

    fn of_kind(graph: &HalfEdgeGraph, kind: VertexKind) -> Vec<VertexId> {
        graph
            .vertices()
            .filter(|(_, v)| v.kind == kind)
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn initial_diagram_is_valid() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        validate(d.graph(), &d.sites).unwrap();
    }

    #[test]
    fn asymmetric_twin_is_detected() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let mut g = d.graph().clone();
        let e = g.edges().map(|(id, _)| id).next().unwrap();
        g.edge_mut(e).unwrap().twin = e;
        assert!(matches!(validate(&g, &d.sites), Err(TopologyError::InvalidTopology(_))));
    }

    #[test]
    fn wrong_clearance_is_detected() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let mut g = d.graph().clone();
        let center = of_kind(&g, VertexKind::Normal)[0];
        g.vertex_mut(center).unwrap().position = Point2::new(0.5, 0.0);
        let err = validate(&g, &d.sites).unwrap_err();
        assert!(err.to_string().contains("clearance"), "{err}");
    }

    #[test]
    fn clearances_are_checked_only_for_listed_vertices() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let mut g = d.graph().clone();
        let center = of_kind(&g, VertexKind::Normal)[0];
        let apex = of_kind(&g, VertexKind::Apex)[0];
        g.vertex_mut(center).unwrap().clearance = 1.0;

        check_clearances(&g, &d.sites, &[apex]).unwrap();
        assert!(check_clearances(&g, &d.sites, &[apex, center]).is_err());

        // Removed vertices are skipped.
        g.remove_vertex(center);
        check_clearances(&g, &d.sites, &[center]).unwrap();
    }

    #[test]
    fn leftover_status_is_detected() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let center = of_kind(d.graph(), VertexKind::Normal)[0];
        let g = with_status(d.graph(), &[center]);
        assert!(matches!(validate(&g, &d.sites), Err(TopologyError::InvalidTopology(_))));
    }

    // ── IN-set admissibility ──

    #[test]
    fn empty_in_set_is_rejected() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        assert!(matches!(check_in_set(d.graph(), &[]), Err(TopologyError::EmptyInSet)));
    }

    #[test]
    fn star_around_the_centre_is_a_tree() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let mut set = of_kind(d.graph(), VertexKind::Normal);
        set.extend(of_kind(d.graph(), VertexKind::Apex));
        let g = with_status(d.graph(), &set);
        check_in_set(&g, &set).unwrap();
    }

    #[test]
    fn separated_vertices_are_disconnected() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let set: Vec<VertexId> = of_kind(d.graph(), VertexKind::Apex).into_iter().take(2).collect();
        let g = with_status(d.graph(), &set);
        assert!(matches!(
            check_in_set(&g, &set),
            Err(TopologyError::DisconnectedInSet { reached: 1, total: 2 })
        ));
    }

    #[test]
    fn whole_graph_contains_a_cycle() {
        let d = VoronoiDiagram::new(1.0, 4).unwrap();
        let set: Vec<VertexId> = d.graph().vertices().map(|(id, _)| id).collect();
        let g = with_status(d.graph(), &set);
        assert!(matches!(
            check_in_set(&g, &set),
            Err(TopologyError::CyclicInSet { vertices: 7, edges: 9 })
        ));
    }
}
