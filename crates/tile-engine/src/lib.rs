//! Contour engine for elevation tiles.
//!
//! Turns a rectangular grid of elevation samples into vector contour
//! geometry, one polyline set per elevation level:
//!
//! ```text
//! Tile::contours(params)
//!      │
//!      ├─► validate & normalize params
//!      │
//!      ├─► memo cache lookup
//!      │         │
//!      │         ├─► hit: return shared result
//!      │         │
//!      │         └─► miss: plan levels ──► trace each level ──► aggregate
//!      │
//!      └─► Arc<TileContours>
//! ```
//!
//! The grid, mask, clip polygon and transform are immutable after tile
//! construction, so results are memoized per parameter tuple for the
//! tile's lifetime.

pub mod cache;
pub mod error;
pub mod grid;
pub mod levels;
pub mod tile;

pub use cache::CacheStats;
pub use error::{Result, TileError};
pub use grid::ElevationGrid;
pub use levels::{plan_levels, round_up_to_step};
pub use tile::{aggregate_levels, ContourParams, Tile, TileContours, TileData};
