use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a half-edge in the graph.
    pub struct EdgeId;
}

/// What separates the two faces on either side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    /// Equidistant curve between two sites.
    #[default]
    Bisector,
    /// Perpendicular ray at a segment endpoint, between the segment's face and
    /// the endpoint's face.
    Separator,
    /// Part of the boundary triangle, adjacent to the outer face.
    Outer,
}

/// A directed half of an edge. Its face lies to the left.
#[derive(Debug, Clone, Default)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: EdgeId,
    pub next: EdgeId,
    pub prev: EdgeId,
    pub face: FaceId,
    pub kind: EdgeKind,
}
