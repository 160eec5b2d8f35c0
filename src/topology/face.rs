use crate::geometry::SiteId;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the half-edge graph.
    pub struct FaceId;
}

/// Transient classification used while a site is being inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceStatus {
    #[default]
    NonIncident,
    /// Has at least one IN vertex on its boundary.
    Incident,
}

/// Data associated with a face.
///
/// Every face except the unbounded outer one is the region closest to a
/// single site.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// Generating site, `None` for the outer face.
    pub site: Option<SiteId>,
    /// One half-edge of the boundary cycle.
    pub edge: EdgeId,
    pub status: FaceStatus,
}

impl FaceData {
    #[must_use]
    pub fn new(site: Option<SiteId>) -> Self {
        Self {
            site,
            edge: EdgeId::default(),
            status: FaceStatus::NonIncident,
        }
    }
}
