//! Spherical Web Mercator projection (EPSG:3857).
//!
//! Maps geographic coordinates in degrees to meters on a sphere. The
//! projection diverges at the poles, so latitudes at or beyond ±90° are
//! out of domain.

use std::f64::consts::PI;

use crate::transform::{ProjectionError, Transform};

/// Earth radius used by the spherical Mercator grid (meters).
const EARTH_RADIUS: f64 = 6378137.0;

/// Spherical Web Mercator transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl Transform for WebMercator {
    fn project(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() >= 90.0 {
            return Err(ProjectionError::OutOfDomain { lon, lat });
        }

        let to_rad = PI / 180.0;
        let x = EARTH_RADIUS * lon * to_rad;
        let y = EARTH_RADIUS * (PI / 4.0 + lat * to_rad / 2.0).tan().ln();
        Ok((x, y))
    }
}
