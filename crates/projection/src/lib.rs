//! Output coordinate transforms.
//!
//! Implements map projections from scratch without external dependencies.
//! Transforms are applied to finished contour geometry and to bounding
//! boxes at reporting time; they never see grid indices.

pub mod mercator;
pub mod transform;

pub use mercator::WebMercator;
pub use transform::{transform_bbox, Identity, ProjectionError, Transform};
