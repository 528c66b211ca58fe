//! The `Transform` seam between native grid coordinates and the output
//! coordinate system.

use terrain_common::BoundingBox;
use thiserror::Error;

/// Errors raised by coordinate transforms.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The input coordinate lies outside the transform's domain.
    #[error("coordinate ({lon}, {lat}) is outside the projection domain")]
    OutOfDomain { lon: f64, lat: f64 },
}

/// A stateless mapping from native (lon, lat) pairs to output coordinates.
///
/// Implementations must be pure: the same input always yields the same
/// output, and projecting never mutates the transform.
pub trait Transform: Send + Sync {
    /// Project a single point. Fails only for out-of-domain input.
    fn project(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError>;
}

/// The identity transform: output coordinates equal native coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn project(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        Ok((lon, lat))
    }
}

/// Project the four corners of a bounding box and return their envelope.
///
/// Used for reporting and statistics only, never for tracing.
pub fn transform_bbox(
    bbox: &BoundingBox,
    transform: &dyn Transform,
) -> Result<BoundingBox, ProjectionError> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for (lon, lat) in bbox.corners() {
        let (x, y) = transform.project(lon, lat)?;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
}
