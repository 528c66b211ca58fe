//! End-to-end tests for the tile contour engine over synthetic tiles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contour::{is_closed, ContourTracer, Point, Polyline, TraceError, TracedLevel};
use projection::{Identity, WebMercator};
use terrain_common::BoundingBox;
use test_utils::{cone_elevations, flat_elevations, slope_elevations};
use tile_engine::{aggregate_levels, ContourParams, ElevationGrid, Tile, TileData, TileError};

fn make_tile(elevations: Vec<i16>, rows: usize, cols: usize) -> Tile {
    Tile::new(TileData {
        bbox: BoundingBox::new(6.0, 43.0, 7.0, 44.0),
        grid: ElevationGrid::unmasked(rows, cols, elevations).unwrap(),
        increments: (1.0 / (cols - 1) as f64, 1.0 / (rows - 1) as f64),
        clip_polygon: None,
        transform: Arc::new(Identity),
    })
    .unwrap()
}

/// Recompute node/way totals from the returned geometry.
fn recount(contours: &std::collections::BTreeMap<i32, Vec<Polyline>>) -> (u64, u64) {
    let mut nodes = 0u64;
    let mut ways = 0u64;
    for polylines in contours.values() {
        for polyline in polylines {
            ways += 1;
            nodes += if is_closed(polyline) {
                (polyline.len() - 1) as u64
            } else {
                polyline.len() as u64
            };
        }
    }
    (nodes, ways)
}

#[test]
fn cone_tile_default_params() {
    let tile = make_tile(cone_elevations(33, 33, 100), 33, 33);
    assert_eq!(tile.min_elevation(), 0);
    assert_eq!(tile.max_elevation(), 100);

    let result = tile.contours(&ContourParams::default()).unwrap();

    // min 0 and max 100 both sit on the step; half-open upper bound.
    let levels: Vec<i32> = result.contours.keys().copied().collect();
    assert_eq!(levels, vec![0, 20, 40, 60, 80]);

    // Totals must match the geometry actually returned.
    let (nodes, ways) = recount(&result.contours);
    assert_eq!(result.node_count, nodes);
    assert_eq!(result.way_count, ways);

    // Every positive level of a cone is made of closed rings well inside
    // the grid.
    for level in [20, 40, 60, 80] {
        let polylines = &result.contours[&level];
        assert!(!polylines.is_empty(), "level {level}");
        for polyline in polylines {
            assert!(is_closed(polyline), "level {level}");
        }
    }
}

#[test]
fn memoization_returns_shared_result() {
    let tile = make_tile(cone_elevations(17, 17, 100), 17, 17);
    let params = ContourParams::default();

    let first = tile.contours(&params).unwrap();
    let second = tile.contours(&params).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    let stats = tile.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn concurrent_callers_share_one_computation() {
    let tile = make_tile(cone_elevations(17, 17, 100), 17, 17);
    let params = ContourParams::default();

    let results = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| tile.contours(&params).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    // Every caller gets the same shared result; the trace ran once.
    for result in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], result));
    }
    let stats = tile.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.entries, 1);
}

#[test]
fn distinct_params_are_distinct_cache_entries() {
    let tile = make_tile(cone_elevations(17, 17, 100), 17, 17);

    tile.contours(&ContourParams::default()).unwrap();
    tile.contours(&ContourParams {
        step_size: 50,
        ..Default::default()
    })
    .unwrap();

    assert_eq!(tile.cache_stats().entries, 2);
}

#[test]
fn default_epsilon_and_zero_epsilon_share_an_entry() {
    let tile = make_tile(cone_elevations(17, 17, 100), 17, 17);

    let exact = tile.contours(&ContourParams::default()).unwrap();
    let zero = tile
        .contours(&ContourParams {
            simplify_epsilon: Some(0.0),
            ..Default::default()
        })
        .unwrap();

    assert!(Arc::ptr_eq(&exact, &zero));
    assert_eq!(tile.cache_stats().entries, 1);
}

#[test]
fn determinism_across_tiles() {
    let a = make_tile(cone_elevations(21, 21, 90), 21, 21);
    let b = make_tile(cone_elevations(21, 21, 90), 21, 21);
    let params = ContourParams::default();

    assert_eq!(
        *a.contours(&params).unwrap(),
        *b.contours(&params).unwrap()
    );
}

#[test]
fn zero_level_excluded_in_range_spanning_zero() {
    // Slope from -40 to 40 crosses zero.
    let tile = make_tile(slope_elevations(9, 9, -40, 40), 9, 9);

    let with_zero = tile.contours(&ContourParams::default()).unwrap();
    assert!(with_zero.contours.contains_key(&0));

    let without = tile
        .contours(&ContourParams {
            exclude_zero: true,
            ..Default::default()
        })
        .unwrap();
    assert!(!without.contours.contains_key(&0));
    assert_eq!(
        without.contours.keys().copied().collect::<Vec<_>>(),
        vec![-40, -20, 20]
    );
}

#[test]
fn flat_tile_yields_empty_result() {
    let tile = make_tile(flat_elevations(9, 9, 100), 9, 9);
    let result = tile.contours(&ContourParams::default()).unwrap();

    assert!(result.contours.is_empty());
    assert_eq!(result.node_count, 0);
    assert_eq!(result.way_count, 0);
}

#[test]
fn all_masked_tile_fails_fast() {
    let grid = ElevationGrid::new(3, 3, vec![-32768; 9], vec![true; 9]).unwrap();
    let result = Tile::new(TileData {
        bbox: BoundingBox::new(6.0, 43.0, 7.0, 44.0),
        grid,
        increments: (0.5, 0.5),
        clip_polygon: None,
        transform: Arc::new(Identity),
    });
    assert!(matches!(result, Err(TileError::NoValidData)));
}

#[test]
fn masked_void_cells_do_not_leak_into_levels() {
    // A void value next to real data: masked, so the level plan must come
    // from the valid range only.
    let mut elevations = slope_elevations(9, 9, 10, 90);
    let mut mask = vec![false; 81];
    elevations[40] = -32768;
    mask[40] = true;

    let tile = Tile::new(TileData {
        bbox: BoundingBox::new(6.0, 43.0, 7.0, 44.0),
        grid: ElevationGrid::new(9, 9, elevations, mask).unwrap(),
        increments: (0.125, 0.125),
        clip_polygon: None,
        transform: Arc::new(Identity),
    })
    .unwrap();

    assert_eq!(tile.min_elevation(), 10);
    assert_eq!(tile.max_elevation(), 90);

    let result = tile.contours(&ContourParams::default()).unwrap();
    let levels: Vec<i32> = result.contours.keys().copied().collect();
    assert_eq!(levels, vec![20, 40, 60, 80]);
}

#[test]
fn max_nodes_per_way_splits_without_changing_node_total() {
    let tile = make_tile(cone_elevations(33, 33, 100), 33, 33);

    let unbounded = tile.contours(&ContourParams::default()).unwrap();
    let bounded = tile
        .contours(&ContourParams {
            max_nodes_per_way: 10,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(bounded.node_count, unbounded.node_count);
    assert!(bounded.way_count > unbounded.way_count);
    for polylines in bounded.contours.values() {
        for polyline in polylines {
            assert!(polyline.len() <= 10);
        }
    }
}

#[test]
fn transformed_bbox_and_summary() {
    let tile = Tile::new(TileData {
        bbox: BoundingBox::new(6.0, 43.0, 7.0, 44.0),
        grid: ElevationGrid::unmasked(3, 3, cone_elevations(3, 3, 50)).unwrap(),
        increments: (0.5, 0.5),
        clip_polygon: None,
        transform: Arc::new(WebMercator),
    })
    .unwrap();

    let native = tile.bbox(false).unwrap();
    assert_eq!(native, BoundingBox::new(6.0, 43.0, 7.0, 44.0));

    let projected = tile.bbox(true).unwrap();
    assert!(projected.min_lon > 600_000.0); // meters now
    assert!(projected.max_lat > projected.min_lat);

    let summary = tile.stats_summary().unwrap();
    assert!(summary.starts_with("tile with 3 x 3 points"));
    // Reporting must not populate the contour cache.
    assert_eq!(tile.cache_stats().entries, 0);
}

#[test]
fn projection_failure_surfaces_from_reporting_and_tracing() {
    // The tile's top edge sits at latitude 90, outside the Web Mercator
    // domain.
    let tile = Tile::new(TileData {
        bbox: BoundingBox::new(6.0, 89.0, 7.0, 90.0),
        grid: ElevationGrid::unmasked(2, 2, vec![0, 10, 0, 10]).unwrap(),
        increments: (1.0, 1.0),
        clip_polygon: None,
        transform: Arc::new(WebMercator),
    })
    .unwrap();

    // Native bbox still reports; the transformed one fails.
    assert!(tile.bbox(false).is_ok());
    assert!(matches!(tile.bbox(true), Err(TileError::Projection(_))));

    // Level 5 crosses the top edge, so tracing projects a vertex at
    // latitude 90 and the whole call fails without caching anything.
    let result = tile.contours(&ContourParams {
        step_size: 5,
        ..Default::default()
    });
    assert!(matches!(result, Err(TileError::Trace(_))));
    assert_eq!(tile.cache_stats().entries, 0);
}

#[test]
fn xyz_dump_writes_one_line_per_cell() {
    let tile = make_tile(slope_elevations(5, 5, 0, 100), 5, 5);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(tile.xyz_filename("heights").unwrap());

    tile.dump_xyz(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 25);
    assert_eq!(lines[0], "6.0000000 44.0000000 0");

    let fields: Vec<&str> = lines[24].split(' ').collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[2], "100");
}

/// Scripted tracer reproducing the reference tile's per-level output, used
/// to pin down the aggregation and counting layer.
struct FixtureTracer {
    invocations: AtomicUsize,
}

impl FixtureTracer {
    fn new() -> Self {
        Self {
            invocations: AtomicUsize::new(0),
        }
    }

    fn open_way(points: usize) -> Polyline {
        (0..points).map(|i| Point::new(i as f64, 0.0)).collect()
    }

    fn closed_way(points: usize) -> Polyline {
        let mut way: Polyline = (0..points - 1)
            .map(|i| {
                let angle = i as f64 / (points - 1) as f64 * std::f64::consts::TAU;
                Point::new(angle.cos(), angle.sin())
            })
            .collect();
        way.push(way[0]);
        way
    }
}

impl ContourTracer for FixtureTracer {
    fn trace(&self, level: i32) -> Result<TracedLevel, TraceError> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        let polylines: Vec<Polyline> = match level {
            // 145 open ways at the lowest level, the first of 5 points.
            20 => (0..145)
                .map(|i| Self::open_way(if i == 0 { 5 } else { 8 }))
                .collect(),
            // A single closed 7-point ring at the summit level.
            1920 => vec![Self::closed_way(7)],
            _ => vec![],
        };

        let node_count = polylines
            .iter()
            .map(|p| {
                if is_closed(p) {
                    (p.len() - 1) as u64
                } else {
                    p.len() as u64
                }
            })
            .sum();
        let way_count = polylines.len() as u64;
        Ok(TracedLevel {
            polylines,
            node_count,
            way_count,
        })
    }
}

#[test]
fn fixture_aggregation_reproduces_reference_counts() {
    let tracer = FixtureTracer::new();
    let levels = vec![20, 1920];

    let result = aggregate_levels(&tracer, &levels).unwrap();

    // One tracer invocation per level.
    assert_eq!(tracer.invocations.load(Ordering::Relaxed), 2);

    let level_20 = &result.contours[&20];
    assert_eq!(level_20.len(), 145);
    assert_eq!(level_20[0].len(), 5);

    let level_1920 = &result.contours[&1920];
    assert_eq!(level_1920.len(), 1);
    assert_eq!(level_1920[0].len(), 7);
    assert_eq!(level_1920[0].first(), level_1920[0].last());

    // Totals are the per-level sums: 5 + 144 * 8 + 6 nodes, 146 ways.
    assert_eq!(result.node_count, 5 + 144 * 8 + 6);
    assert_eq!(result.way_count, 146);
}

/// A tracer that always fails, to verify errors abort the whole call.
struct FailingTracer;

impl ContourTracer for FailingTracer {
    fn trace(&self, _level: i32) -> Result<TracedLevel, TraceError> {
        Err(TraceError::DegenerateField { rows: 0, cols: 0 })
    }
}

#[test]
fn tracer_failure_aborts_aggregation() {
    let result = aggregate_levels(&FailingTracer, &[20, 40]);
    assert!(result.is_err());
}
