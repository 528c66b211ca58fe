//! Common geometry types shared across the terrain-contours workspace.

pub mod bbox;
pub mod polygon;

pub use bbox::BoundingBox;
pub use polygon::{ClipPolygon, PolygonParseError};
