//! Test data generators for creating synthetic elevation tiles.
//!
//! These generators create predictable, verifiable elevation patterns
//! that can be used across the test suite.

/// Creates a radial cone of elevations: highest at the grid center,
/// falling off linearly toward the edges.
///
/// Contours of a cone are concentric closed rings, which makes node and
/// way counting easy to reason about in tests.
///
/// # Arguments
///
/// * `rows`, `cols` - Grid dimensions
/// * `peak` - Elevation at the center
///
/// # Returns
///
/// Elevations in row-major order (row 0 first).
pub fn cone_elevations(rows: usize, cols: usize, peak: i16) -> Vec<i16> {
    let cx = (cols - 1) as f64 / 2.0;
    let cy = (rows - 1) as f64 / 2.0;
    // Normalize by the half-width so every positive level's ring closes
    // inside the grid instead of running off the edges.
    let max_dist = cx.min(cy);

    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let dx = col as f64 - cx;
            let dy = row as f64 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let ele = peak as f64 * (1.0 - dist / max_dist);
            data.push(ele.round().max(0.0) as i16);
        }
    }
    data
}

/// Creates a west-to-east linear slope from `low` to `high`.
///
/// Contours of a slope are straight north-south open lines.
pub fn slope_elevations(rows: usize, cols: usize, low: i16, high: i16) -> Vec<i16> {
    let mut data = Vec::with_capacity(rows * cols);
    for _row in 0..rows {
        for col in 0..cols {
            let t = col as f64 / (cols - 1).max(1) as f64;
            data.push((low as f64 + t * (high - low) as f64).round() as i16);
        }
    }
    data
}

/// Creates a perfectly flat grid.
pub fn flat_elevations(rows: usize, cols: usize, value: i16) -> Vec<i16> {
    vec![value; rows * cols]
}
