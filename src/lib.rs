//! Incremental construction of Voronoi diagrams for point and line-segment
//! sites inside a bounding disk.
//!
//! Sites are inserted one at a time into a half-edge graph that is a valid
//! planar diagram between calls. See [`VoronoiDiagram`].

pub mod diagram;
pub mod error;
pub mod geometry;
pub mod math;
pub mod spatial;
pub mod topology;

pub use diagram::VoronoiDiagram;
pub use error::{InsertionError, Result, VoronoiError};
