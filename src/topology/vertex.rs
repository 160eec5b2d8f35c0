use crate::math::Point2;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the half-edge graph.
    pub struct VertexId;
}

/// Permanent role of a vertex in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// Equidistant from three or more sites.
    Normal,
    /// Corner of the outer boundary triangle. Never deleted.
    Outer,
    /// Subdivides a bisector where a segment's split line crosses it.
    Split,
    /// Endpoint of a segment site. Never deleted.
    Endpoint,
    /// Clearance minimum of a point–point or point–segment bisector.
    Apex,
    /// Lies on a separator line of a segment endpoint.
    Separator,
}

impl VertexKind {
    /// Smallest number of incident edges a valid vertex of this kind has.
    #[must_use]
    pub fn min_degree(self) -> usize {
        match self {
            Self::Normal | Self::Outer => 3,
            Self::Split | Self::Endpoint | Self::Apex | Self::Separator => 2,
        }
    }
}

/// Transient classification used while a site is being inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexStatus {
    #[default]
    Undecided,
    /// Will be deleted by the current insertion.
    In,
    /// Survives the current insertion.
    Out,
    /// Created by the current insertion.
    New,
}

/// Data associated with a vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub position: Point2,
    /// Distance to the sites of the faces around the vertex.
    pub clearance: f64,
    pub kind: VertexKind,
    pub status: VertexStatus,
    /// In-circle value against the site being inserted.
    pub det: f64,
    /// Whether the vertex has been pushed to the insertion queue.
    pub in_queue: bool,
    /// One half-edge leaving this vertex.
    pub edge: EdgeId,
    /// Creation index, unique within a diagram.
    pub index: usize,
}

impl VertexData {
    /// Creates an undecided vertex without an outgoing edge.
    #[must_use]
    pub fn new(position: Point2, clearance: f64, kind: VertexKind, index: usize) -> Self {
        Self {
            position,
            clearance,
            kind,
            status: VertexStatus::Undecided,
            det: 0.0,
            in_queue: false,
            edge: EdgeId::default(),
            index,
        }
    }

    /// Outer and endpoint vertices can never be classified IN.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self.kind, VertexKind::Outer | VertexKind::Endpoint)
    }

    /// Clears all per-insertion state.
    pub fn reset_status(&mut self) {
        self.status = VertexStatus::Undecided;
        self.in_queue = false;
        self.det = 0.0;
    }
}
