use std::fmt;

use thiserror::Error;

use crate::geometry::SiteId;
use crate::math::Point2;
use crate::topology::FaceId;

/// Top-level error type for Voronoi diagram construction.
#[derive(Debug, Error)]
pub enum VoronoiError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A site could not be inserted. The diagram is unchanged.
    #[error("site {site} rejected: {cause}")]
    SiteRejected {
        site: SiteRef,
        #[source]
        cause: InsertionError,
    },

    /// The diagram failed validation after a committed change. Once this is
    /// returned the diagram refuses further insertions.
    #[error("diagram invariant violated: {0}")]
    InvariantViolation(String),
}

/// Identifies the site an insertion error refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SiteRef {
    Point(Point2),
    Segment(SiteId, SiteId),
}

impl fmt::Display for SiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(p) => write!(f, "point ({}, {})", p.x, p.y),
            Self::Segment(a, b) => write!(f, "segment {a:?}-{b:?}"),
        }
    }
}

/// Reason a single insertion was aborted.
#[derive(Debug, Error)]
pub enum InsertionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Errors detected from the arguments alone, before any graph mutation.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("coordinates are not finite")]
    NotFinite,

    #[error("distance {distance} from origin exceeds far radius {far_radius}")]
    OutsideFarRadius { distance: f64, far_radius: f64 },

    #[error("coincides with an existing site at ({x}, {y})")]
    DuplicateSite { x: f64, y: f64 },

    #[error("lies on an existing line-segment site")]
    OnSegmentSite,

    #[error("unknown site handle {0:?}")]
    UnknownSite(SiteId),

    #[error("site {0:?} is not a user point site")]
    NotAPointSite(SiteId),

    #[error("segment endpoints are identical")]
    DegenerateSegment,

    #[error("segment already inserted")]
    DuplicateSegment,

    #[error("segment touches or crosses an existing segment")]
    SegmentIntersection,

    #[error("segment passes through point site {0:?}")]
    PointOnSegment(SiteId),
}

/// Errors related to the half-edge graph and the IN-vertex set.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("no vertex of the seed face is closer to the new site than its generators")]
    NoSeedVertex,

    #[error("IN-vertex set is empty")]
    EmptyInSet,

    #[error("IN-vertex set is disconnected ({reached} of {total} reachable from the seed)")]
    DisconnectedInSet { reached: usize, total: usize },

    #[error("IN-vertex set contains a cycle ({vertices} vertices, {edges} edges)")]
    CyclicInSet { vertices: usize, edges: usize },

    #[error("every boundary vertex of face {0:?} is IN")]
    FaceFullyInvaded(FaceId),

    #[error("face {face:?} has {runs} IN runs where exactly one is required")]
    UnexpectedRunCount { face: FaceId, runs: usize },

    #[error("endpoint face {0:?} was not reached by the IN-vertex set")]
    EndpointNotReached(FaceId),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors from numeric root searches.
#[derive(Debug, Error)]
pub enum NumericError {
    #[error("no sign change on bracket [{lo}, {hi}] (f = {f_lo}, {f_hi})")]
    NoSignChange {
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    },

    #[error("root search did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    /// A computed vertex is not equidistant from the sites it separates.
    #[error("vertex at ({x}, {y}) is {deviation} off the bisector of its sites")]
    OffBisector { x: f64, y: f64, deviation: f64 },

    #[error("vertex at ({x}, {y}) lies outside the slab of a segment site")]
    OutsideSlab { x: f64, y: f64 },
}

/// Convenience type alias for results using [`VoronoiError`].
pub type Result<T> = std::result::Result<T, VoronoiError>;
