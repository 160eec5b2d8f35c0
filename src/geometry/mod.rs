pub mod bisector;
pub mod site;

pub use bisector::EdgeCurve;
pub use site::{Segment, Site, SiteId};
