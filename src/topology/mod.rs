pub mod edge;
pub mod face;
pub mod vertex;

pub use edge::{EdgeId, EdgeKind, HalfEdge};
pub use face::{FaceData, FaceId, FaceStatus};
pub use vertex::{VertexData, VertexId, VertexKind, VertexStatus};

use crate::error::TopologyError;
use slotmap::{Key, SlotMap};

/// Half-edge representation of a planar subdivision.
///
/// Entities reference each other via typed IDs (generational indices), so
/// removed entities are detected instead of silently aliased. Every face is
/// bounded by a single cycle of half-edges linked through `next`/`prev`;
/// each half-edge has its face on the left.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeGraph {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, HalfEdge>,
    faces: SlotMap<FaceId, FaceData>,
}

impl HalfEdgeGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Removes a vertex. Removing an absent vertex does nothing.
    pub fn remove_vertex(&mut self, id: VertexId) {
        self.vertices.remove(id);
    }

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    /// Iterates mutably over all vertices.
    pub fn vertices_mut(&mut self) -> impl Iterator<Item = (VertexId, &mut VertexData)> {
        self.vertices.iter_mut()
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    // --- Edge operations ---

    /// Returns a reference to the half-edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn edge(&self, id: EdgeId) -> Result<&HalfEdge, TopologyError> {
        self.edges
            .get(id)
            .ok_or(TopologyError::EntityNotFound("edge"))
    }

    /// Returns a mutable reference to the half-edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut HalfEdge, TopologyError> {
        self.edges
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("edge"))
    }

    /// Inserts the pair `from → to` (in `left`) and `to → from` (in `right`)
    /// and returns them in that order.
    ///
    /// The `next`/`prev` links are left unset. A vertex without an outgoing
    /// half-edge adopts the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is not in the graph.
    pub fn add_twin_edges(
        &mut self,
        from: VertexId,
        to: VertexId,
        left: FaceId,
        right: FaceId,
        kind: EdgeKind,
    ) -> Result<(EdgeId, EdgeId), TopologyError> {
        self.vertex(from)?;
        self.vertex(to)?;
        let forward = self.edges.insert(HalfEdge {
            origin: from,
            face: left,
            kind,
            ..HalfEdge::default()
        });
        let backward = self.edges.insert(HalfEdge {
            origin: to,
            twin: forward,
            face: right,
            kind,
            ..HalfEdge::default()
        });
        self.edge_mut(forward)?.twin = backward;
        for (v, e) in [(from, forward), (to, backward)] {
            let vertex = self.vertex_mut(v)?;
            if vertex.edge.is_null() {
                vertex.edge = e;
            }
        }
        Ok((forward, backward))
    }

    /// Links `b` after `a` in a face cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if either half-edge is not in the graph.
    pub fn set_next(&mut self, a: EdgeId, b: EdgeId) -> Result<(), TopologyError> {
        self.edge(b)?;
        self.edge_mut(a)?.next = b;
        self.edge_mut(b)?.prev = a;
        Ok(())
    }

    /// Vertex at the head of a half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its twin is not in the graph.
    pub fn target(&self, e: EdgeId) -> Result<VertexId, TopologyError> {
        Ok(self.edge(self.edge(e)?.twin)?.origin)
    }

    /// Inserts `v` in the interior of `e` and of its twin.
    ///
    /// `e: a → b` becomes `e: a → v` followed by a new `v → b` in the same
    /// face; the twin `b → a` becomes `b → v` followed by a new `v → a`. The
    /// new twin half `v → a` is returned. `v` must not have edges yet.
    ///
    /// # Errors
    ///
    /// Returns an error if `e`, its neighbours or `v` are not in the graph.
    pub fn split_edge(&mut self, e: EdgeId, v: VertexId) -> Result<EdgeId, TopologyError> {
        self.vertex(v)?;
        let HalfEdge {
            twin,
            next,
            face,
            kind,
            ..
        } = self.edge(e)?.clone();
        let HalfEdge {
            next: twin_next,
            face: twin_face,
            ..
        } = self.edge(twin)?.clone();

        let h2 = self.edges.insert(HalfEdge {
            origin: v,
            twin,
            next,
            prev: e,
            face,
            kind,
        });
        let t2 = self.edges.insert(HalfEdge {
            origin: v,
            twin: e,
            next: twin_next,
            prev: twin,
            face: twin_face,
            kind,
        });

        let head = self.edge_mut(e)?;
        head.next = h2;
        head.twin = t2;
        let tail = self.edge_mut(twin)?;
        tail.next = t2;
        tail.twin = h2;
        self.edge_mut(next)?.prev = h2;
        self.edge_mut(twin_next)?.prev = t2;
        self.vertex_mut(v)?.edge = h2;
        Ok(t2)
    }

    /// Removes a half-edge. Removing an absent half-edge does nothing.
    pub fn remove_edge(&mut self, id: EdgeId) {
        self.edges.remove(id);
    }

    /// Iterates over all half-edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &HalfEdge)> {
        self.edges.iter()
    }

    #[must_use]
    pub fn num_half_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len() / 2
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or(TopologyError::EntityNotFound("face"))
    }

    /// Returns a mutable reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("face"))
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    // --- Traversal ---

    /// Boundary cycle of a face, starting at its stored half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if a link is dangling or the walk does not close.
    pub fn face_edges(&self, f: FaceId) -> Result<Vec<EdgeId>, TopologyError> {
        let start = self.face(f)?.edge;
        let mut cycle = Vec::new();
        let mut e = start;
        loop {
            cycle.push(e);
            e = self.edge(e)?.next;
            if e == start {
                return Ok(cycle);
            }
            if cycle.len() > self.edges.len() {
                return Err(TopologyError::InvalidTopology(format!(
                    "boundary of face {f:?} does not close"
                )));
            }
        }
    }

    /// Origins of the boundary half-edges of a face, in cycle order.
    ///
    /// # Errors
    ///
    /// See [`HalfEdgeGraph::face_edges`].
    pub fn face_vertices(&self, f: FaceId) -> Result<Vec<VertexId>, TopologyError> {
        self.face_edges(f)?
            .into_iter()
            .map(|e| Ok(self.edge(e)?.origin))
            .collect()
    }

    /// Half-edges leaving `v`, found by rotating with `twin(prev(e))`.
    ///
    /// # Errors
    ///
    /// Returns an error if a link is dangling or the rotation does not close.
    pub fn out_edges(&self, v: VertexId) -> Result<Vec<EdgeId>, TopologyError> {
        let start = self.vertex(v)?.edge;
        let mut out = Vec::new();
        let mut e = start;
        loop {
            if self.edge(e)?.origin != v {
                return Err(TopologyError::InvalidTopology(format!(
                    "half-edge {e:?} around vertex {v:?} does not start there"
                )));
            }
            out.push(e);
            e = self.edge(self.edge(e)?.prev)?.twin;
            if e == start {
                return Ok(out);
            }
            if out.len() > self.edges.len() {
                return Err(TopologyError::InvalidTopology(format!(
                    "rotation around vertex {v:?} does not close"
                )));
            }
        }
    }

    /// Vertices adjacent to `v`, one entry per incident edge.
    ///
    /// # Errors
    ///
    /// See [`HalfEdgeGraph::out_edges`].
    pub fn neighbors(&self, v: VertexId) -> Result<Vec<VertexId>, TopologyError> {
        self.out_edges(v)?
            .into_iter()
            .map(|e| self.target(e))
            .collect()
    }

    /// Faces around `v`, one entry per incident edge.
    ///
    /// # Errors
    ///
    /// See [`HalfEdgeGraph::out_edges`].
    pub fn adjacent_faces(&self, v: VertexId) -> Result<Vec<FaceId>, TopologyError> {
        self.out_edges(v)?
            .into_iter()
            .map(|e| Ok(self.edge(e)?.face))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    /// A triangle `a → b → c` with an inner and an outer face.
    fn triangle() -> (HalfEdgeGraph, [VertexId; 3], FaceId, FaceId) {
        let mut g = HalfEdgeGraph::new();
        let v = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]
            .map(|(x, y)| g.add_vertex(VertexData::new(Point2::new(x, y), 0.0, VertexKind::Normal, 0)));
        let inner = g.add_face(FaceData::new(None));
        let outer = g.add_face(FaceData::new(None));
        let (ab, ba) = g.add_twin_edges(v[0], v[1], inner, outer, EdgeKind::Bisector).unwrap();
        let (bc, cb) = g.add_twin_edges(v[1], v[2], inner, outer, EdgeKind::Bisector).unwrap();
        let (ca, ac) = g.add_twin_edges(v[2], v[0], inner, outer, EdgeKind::Bisector).unwrap();
        g.set_next(ab, bc).unwrap();
        g.set_next(bc, ca).unwrap();
        g.set_next(ca, ab).unwrap();
        g.set_next(ac, cb).unwrap();
        g.set_next(cb, ba).unwrap();
        g.set_next(ba, ac).unwrap();
        g.face_mut(inner).unwrap().edge = ab;
        g.face_mut(outer).unwrap().edge = ba;
        (g, v, inner, outer)
    }

    #[test]
    fn face_cycles() {
        let (g, v, inner, outer) = triangle();
        assert_eq!(g.face_vertices(inner).unwrap(), vec![v[0], v[1], v[2]]);
        assert_eq!(g.face_vertices(outer).unwrap(), vec![v[1], v[0], v[2]]);
        assert_eq!(g.num_edges(), 3);
    }

    #[test]
    fn rotation_around_vertex() {
        let (g, v, _, _) = triangle();
        let mut n = g.neighbors(v[0]).unwrap();
        n.sort();
        let mut expected = vec![v[1], v[2]];
        expected.sort();
        assert_eq!(n, expected);
    }

    #[test]
    fn split_edge_keeps_cycles_closed() {
        let (mut g, v, inner, outer) = triangle();
        let ab = g.face(inner).unwrap().edge;
        let m = g.add_vertex(VertexData::new(Point2::new(0.5, 0.0), 0.0, VertexKind::Split, 1));
        let t2 = g.split_edge(ab, m).unwrap();

        assert_eq!(g.face_vertices(inner).unwrap(), vec![v[0], m, v[1], v[2]]);
        assert_eq!(g.face_vertices(outer).unwrap(), vec![v[1], m, v[0], v[2]]);
        assert_eq!(g.edge(t2).unwrap().origin, m);
        assert_eq!(g.target(t2).unwrap(), v[0]);
        assert_eq!(g.edge(g.edge(ab).unwrap().twin).unwrap().twin, ab);
        assert_eq!(g.neighbors(m).unwrap().len(), 2);
        assert_eq!(g.num_edges(), 4);
    }

    #[test]
    fn removing_twice_is_a_no_op() {
        let (mut g, v, inner, _) = triangle();
        let e = g.face(inner).unwrap().edge;
        g.remove_edge(e);
        g.remove_edge(e);
        g.remove_vertex(v[0]);
        g.remove_vertex(v[0]);
        assert!(g.edge(e).is_err());
        assert!(g.vertex(v[0]).is_err());
        assert_eq!(g.num_half_edges(), 5);
    }

    #[test]
    fn broken_cycle_is_reported() {
        let (mut g, _, inner, _) = triangle();
        let e = g.face(inner).unwrap().edge;
        let next = g.edge(e).unwrap().next;
        g.remove_edge(next);
        assert!(g.face_edges(inner).is_err());
    }
}
