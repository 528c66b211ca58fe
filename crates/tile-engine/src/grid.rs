//! The elevation grid and its validity mask.

use crate::error::{Result, TileError};

/// A rectangular grid of elevation samples with a co-located validity mask.
///
/// Row-major storage; row index increases southward, column index eastward.
/// `mask[i] == true` marks an invalid (void / no-data) cell, which is
/// excluded from the elevation range and from tracing. Immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    rows: usize,
    cols: usize,
    elevations: Vec<i16>,
    mask: Vec<bool>,
}

impl ElevationGrid {
    /// Create a grid, validating that dimensions are positive and that the
    /// elevation and mask arrays both have `rows * cols` entries.
    pub fn new(rows: usize, cols: usize, elevations: Vec<i16>, mask: Vec<bool>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(TileError::invalid_parameter(
                "rows/cols",
                format!("grid dimensions must be positive, got {rows} x {cols}"),
            ));
        }
        if elevations.len() != rows * cols {
            return Err(TileError::invalid_parameter(
                "elevations",
                format!(
                    "expected {} samples for a {rows} x {cols} grid, got {}",
                    rows * cols,
                    elevations.len()
                ),
            ));
        }
        if mask.len() != elevations.len() {
            return Err(TileError::invalid_parameter(
                "mask",
                format!(
                    "mask has {} entries but grid has {} samples",
                    mask.len(),
                    elevations.len()
                ),
            ));
        }

        Ok(Self {
            rows,
            cols,
            elevations,
            mask,
        })
    }

    /// Convenience constructor for a grid with every cell valid.
    pub fn unmasked(rows: usize, cols: usize, elevations: Vec<i16>) -> Result<Self> {
        let mask = vec![false; elevations.len()];
        Self::new(rows, cols, elevations, mask)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at (row, col); `None` when out of range or masked.
    pub fn get(&self, row: usize, col: usize) -> Option<i16> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let i = row * self.cols + col;
        (!self.mask[i]).then(|| self.elevations[i])
    }

    /// Raw stored value at (row, col), masked or not.
    ///
    /// Used by the xyz dump, which writes every cell as stored.
    pub fn raw(&self, row: usize, col: usize) -> i16 {
        self.elevations[row * self.cols + col]
    }

    /// Min and max elevation over unmasked cells only.
    ///
    /// Fails with [`TileError::NoValidData`] when every cell is masked.
    pub fn elevation_range(&self) -> Result<(i16, i16)> {
        let mut range: Option<(i16, i16)> = None;
        for (value, &masked) in self.elevations.iter().zip(self.mask.iter()) {
            if masked {
                continue;
            }
            range = Some(match range {
                Some((min, max)) => (min.min(*value), max.max(*value)),
                None => (*value, *value),
            });
        }
        range.ok_or(TileError::NoValidData)
    }

    /// The grid as a flat `f64` field with masked cells replaced by NaN,
    /// ready for tracing.
    pub fn nan_masked(&self) -> Vec<f64> {
        self.elevations
            .iter()
            .zip(self.mask.iter())
            .map(|(&value, &masked)| if masked { f64::NAN } else { value as f64 })
            .collect()
    }
}
