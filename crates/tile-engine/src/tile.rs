//! The tile contour engine: orchestrates level planning, per-level tracing
//! and result aggregation over one immutable elevation tile.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use contour::{
    ContourTracer, MarchingSquaresTracer, Polyline, ScalarField, TraceError, TracedLevel,
};
use projection::{transform_bbox, Transform};
use rayon::prelude::*;
use terrain_common::{BoundingBox, ClipPolygon};
use tracing::{debug, info};

use crate::cache::{CacheStats, ContourCache, ParamKey};
use crate::error::{Result, TileError};
use crate::grid::ElevationGrid;
use crate::levels::plan_levels;

/// Parameters for one contour extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourParams {
    /// Elevation difference between contiguous levels.
    pub step_size: i32,
    /// Maximum nodes per way; 0 means unbounded.
    pub max_nodes_per_way: u64,
    /// Discard the 0-elevation level.
    pub exclude_zero: bool,
    /// Explicit lower bound for the level range.
    pub min_level: Option<i32>,
    /// Explicit (exclusive) upper bound for the level range.
    pub max_level: Option<i32>,
    /// Simplification tolerance; `None` or a non-positive value traces
    /// exactly.
    pub simplify_epsilon: Option<f64>,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            step_size: 20,
            max_nodes_per_way: 0,
            exclude_zero: false,
            min_level: None,
            max_level: None,
            simplify_epsilon: None,
        }
    }
}

impl ContourParams {
    fn validate(&self) -> Result<()> {
        if self.step_size <= 0 {
            return Err(TileError::invalid_parameter(
                "step_size",
                format!("must be positive, got {}", self.step_size),
            ));
        }
        if let Some(epsilon) = self.simplify_epsilon {
            if !epsilon.is_finite() || epsilon < 0.0 {
                return Err(TileError::invalid_parameter(
                    "simplify_epsilon",
                    format!("must be a non-negative finite value, got {epsilon}"),
                ));
            }
        }
        Ok(())
    }

    /// Epsilon with defaults normalized: `None` and `Some(0.0)` both mean
    /// no simplification and must hit the same cache entry.
    fn normalized_epsilon(&self) -> Option<f64> {
        self.simplify_epsilon.filter(|&e| e > 0.0)
    }

    fn cache_key(&self) -> ParamKey {
        (
            self.step_size,
            self.max_nodes_per_way,
            self.exclude_zero,
            self.min_level,
            self.max_level,
            self.normalized_epsilon().map(f64::to_bits),
        )
    }
}

/// Contour geometry and statistics for one parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct TileContours {
    /// Total unique coordinates across all levels.
    pub node_count: u64,
    /// Total ways across all levels.
    pub way_count: u64,
    /// Polylines per level, ascending. Every planned level is present;
    /// levels with no retained geometry map to an empty vec.
    pub contours: BTreeMap<i32, Vec<Polyline>>,
}

/// Inputs assembled by the upstream tile loader.
pub struct TileData {
    /// Native bounding box of the tile.
    pub bbox: BoundingBox,
    /// Elevation samples and validity mask.
    pub grid: ElevationGrid,
    /// Per-cell spacing: (lon increment, lat increment).
    pub increments: (f64, f64),
    /// Optional boundary constraining retained geometry.
    pub clip_polygon: Option<ClipPolygon>,
    /// Output coordinate transform.
    pub transform: Arc<dyn Transform>,
}

/// One elevation tile and its contour memo cache.
///
/// The grid, mask, clip polygon and transform never change after
/// construction; only the cache grows.
pub struct Tile {
    bbox: BoundingBox,
    grid: ElevationGrid,
    lon_increment: f64,
    lat_increment: f64,
    clip_polygon: Option<ClipPolygon>,
    transform: Arc<dyn Transform>,
    min_elevation: i16,
    max_elevation: i16,
    cache: ContourCache,
}

impl Tile {
    /// Build a tile from assembled tile data. Fails fast when every cell
    /// is masked.
    pub fn new(data: TileData) -> Result<Self> {
        let (min_elevation, max_elevation) = data.grid.elevation_range()?;
        debug!(
            rows = data.grid.rows(),
            cols = data.grid.cols(),
            min_elevation,
            max_elevation,
            "tile constructed"
        );

        Ok(Self {
            bbox: data.bbox,
            grid: data.grid,
            lon_increment: data.increments.0,
            lat_increment: data.increments.1,
            clip_polygon: data.clip_polygon,
            transform: data.transform,
            min_elevation,
            max_elevation,
            cache: ContourCache::new(),
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Minimum elevation over unmasked cells.
    pub fn min_elevation(&self) -> i16 {
        self.min_elevation
    }

    /// Maximum elevation over unmasked cells.
    pub fn max_elevation(&self) -> i16 {
        self.max_elevation
    }

    /// Longitude of a column.
    pub fn cell_longitude(&self, col: usize) -> f64 {
        self.bbox.min_lon + col as f64 * self.lon_increment
    }

    /// Latitude of a row. Row index increases southward.
    pub fn cell_latitude(&self, row: usize) -> f64 {
        self.bbox.max_lat - row as f64 * self.lat_increment
    }

    /// The tile's bounding box, optionally passed through the output
    /// transform. Used for reporting only.
    pub fn bbox(&self, apply_transform: bool) -> Result<BoundingBox> {
        if apply_transform {
            Ok(transform_bbox(&self.bbox, self.transform.as_ref())?)
        } else {
            Ok(self.bbox)
        }
    }

    /// One-line summary of the tile: dimensions, transformed bounding box
    /// and elevation range. Never triggers tracing.
    pub fn stats_summary(&self) -> Result<String> {
        let bbox = self.bbox(true)?;
        Ok(format!(
            "tile with {} x {} points, bbox: ({:.2}, {:.2}, {:.2}, {:.2}); \
             minimum elevation: {}; maximum elevation: {}",
            self.rows(),
            self.cols(),
            bbox.min_lon,
            bbox.min_lat,
            bbox.max_lon,
            bbox.max_lat,
            self.min_elevation,
            self.max_elevation,
        ))
    }

    /// Extract contours for `params`, memoized per normalized parameter
    /// tuple. A repeated call with equal parameters returns the shared
    /// previous result without re-tracing.
    pub fn contours(&self, params: &ContourParams) -> Result<Arc<TileContours>> {
        params.validate()?;
        self.cache
            .get_or_compute(params.cache_key(), || self.compute_contours(params))
    }

    /// Memo cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn compute_contours(&self, params: &ContourParams) -> Result<TileContours> {
        let levels = plan_levels(
            self.min_elevation as i32,
            self.max_elevation as i32,
            params.step_size,
            params.exclude_zero,
            params.min_level,
            params.max_level,
        );
        debug!(
            num_levels = levels.len(),
            first_level = levels.first().copied().unwrap_or(0),
            last_level = levels.last().copied().unwrap_or(0),
            "planned contour levels"
        );

        let tracer = MarchingSquaresTracer::new(
            self.scalar_field(),
            self.clip_polygon.clone(),
            Arc::clone(&self.transform),
            params.max_nodes_per_way,
            params.normalized_epsilon(),
        );

        let result = aggregate_levels(&tracer, &levels)?;
        info!(
            levels = levels.len(),
            nodes = result.node_count,
            ways = result.way_count,
            "traced tile contours"
        );
        Ok(result)
    }

    fn scalar_field(&self) -> ScalarField {
        let x = (0..self.cols()).map(|col| self.cell_longitude(col)).collect();
        let y = (0..self.rows()).map(|row| self.cell_latitude(row)).collect();
        ScalarField::new(self.grid.nan_masked(), self.rows(), self.cols(), x, y)
    }

    /// Dump one line per grid cell as `"<lon> <lat> <elevation>"`.
    ///
    /// Masked cells are written with their stored raw value.
    pub fn write_xyz(&self, out: &mut impl Write) -> Result<()> {
        for row in 0..self.rows() {
            let lat = self.cell_latitude(row);
            for col in 0..self.cols() {
                let lon = self.cell_longitude(col);
                writeln!(out, "{lon:.7} {lat:.7} {}", self.grid.raw(row, col))?;
            }
        }
        Ok(())
    }

    /// Write the xyz dump to a file. Failure to open or write aborts the
    /// dump; a partially written file is not cleaned up.
    pub fn dump_xyz(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_xyz(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Build the conventional dump filename from the transformed bounding
    /// box, e.g. `heights_lon6.00_7.00lat43.00_44.00.xyz`.
    pub fn xyz_filename(&self, prefix: &str) -> Result<String> {
        let bbox = self.bbox(true)?;
        Ok(format!(
            "{prefix}_lon{:.2}_{:.2}lat{:.2}_{:.2}.xyz",
            bbox.min_lon, bbox.max_lon, bbox.min_lat, bbox.max_lat
        ))
    }
}

/// Trace every planned level and aggregate geometry and counts.
///
/// Levels are independent, so tracing runs in parallel; the result map is
/// assembled in ascending level order and the counts are plain sums. Any
/// level failure aborts the whole aggregation.
pub fn aggregate_levels(
    tracer: &(dyn ContourTracer + Sync),
    levels: &[i32],
) -> Result<TileContours> {
    let traced: Vec<(i32, TracedLevel)> = levels
        .par_iter()
        .map(|&level| tracer.trace(level).map(|t| (level, t)))
        .collect::<std::result::Result<_, TraceError>>()?;

    let mut node_count = 0u64;
    let mut way_count = 0u64;
    let mut contours = BTreeMap::new();
    for (level, level_result) in traced {
        node_count += level_result.node_count;
        way_count += level_result.way_count;
        contours.insert(level, level_result.polylines);
    }

    Ok(TileContours {
        node_count,
        way_count,
        contours,
    })
}
