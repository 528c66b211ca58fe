//! The contour-tracing capability and its marching-squares implementation.

use std::sync::Arc;

use projection::{ProjectionError, Transform};
use terrain_common::ClipPolygon;
use thiserror::Error;
use tracing::debug;

use crate::field::ScalarField;
use crate::march::{is_closed, link_segments, march_squares, Point, Polyline};
use crate::simplify::simplify_rdp;

/// Errors raised while tracing a contour level.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The field is too small to contain any cell.
    #[error("field of {rows} x {cols} samples is too small to trace")]
    DegenerateField { rows: usize, cols: usize },

    /// The output transform rejected a traced vertex.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),
}

/// Geometry and statistics for a single traced level.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedLevel {
    /// Polylines in output coordinates; closed rings repeat their first
    /// point at the end.
    pub polylines: Vec<Polyline>,
    /// Unique coordinate count. A closed ring of `n` points contributes
    /// `n - 1` since the repeated endpoint is one node.
    pub node_count: u64,
    /// Number of ways after splitting.
    pub way_count: u64,
}

/// The tracing capability the engine depends on.
///
/// Implementations must be deterministic: the same level on the same input
/// always yields identical geometry.
pub trait ContourTracer {
    /// Trace the level-set geometry at `level`.
    fn trace(&self, level: i32) -> Result<TracedLevel, TraceError>;
}

/// Marching-squares tracer over a NaN-masked scalar field.
///
/// Per level: extract segments, link them into polylines, clip against the
/// optional polygon, project into output coordinates, simplify, and split
/// into bounded-length ways.
pub struct MarchingSquaresTracer {
    field: ScalarField,
    clip: Option<ClipPolygon>,
    transform: Arc<dyn Transform>,
    max_nodes_per_way: u64,
    simplify_epsilon: Option<f64>,
}

impl MarchingSquaresTracer {
    /// Create a tracer for one field and parameter set.
    ///
    /// `max_nodes_per_way` of 0 means unbounded; values below 2 cannot
    /// split and are treated as unbounded as well. `simplify_epsilon` of
    /// `None` or a non-positive value disables simplification.
    pub fn new(
        field: ScalarField,
        clip: Option<ClipPolygon>,
        transform: Arc<dyn Transform>,
        max_nodes_per_way: u64,
        simplify_epsilon: Option<f64>,
    ) -> Self {
        Self {
            field,
            clip,
            transform,
            max_nodes_per_way,
            simplify_epsilon,
        }
    }
}

impl ContourTracer for MarchingSquaresTracer {
    fn trace(&self, level: i32) -> Result<TracedLevel, TraceError> {
        let (rows, cols) = (self.field.rows(), self.field.cols());
        if rows < 2 || cols < 2 {
            return Err(TraceError::DegenerateField { rows, cols });
        }

        let segments = march_squares(&self.field, level as f64);
        let linked = link_segments(&segments);

        let mut retained: Vec<Polyline> = Vec::with_capacity(linked.len());
        for polyline in linked {
            match &self.clip {
                Some(polygon) => retained.extend(clip_polyline(&polyline, polygon)),
                None => retained.push(polyline),
            }
        }

        let mut node_count = 0u64;
        let mut ways: Vec<Polyline> = Vec::with_capacity(retained.len());
        for polyline in retained {
            let mut projected = Vec::with_capacity(polyline.len());
            for p in &polyline {
                let (x, y) = self.transform.project(p.x, p.y)?;
                projected.push(Point::new(x, y));
            }

            if let Some(epsilon) = self.simplify_epsilon {
                if epsilon > 0.0 {
                    projected = simplify_rdp(&projected, epsilon);
                }
            }

            node_count += unique_nodes(&projected);
            ways.extend(split_way(projected, self.max_nodes_per_way));
        }

        let way_count = ways.len() as u64;
        debug!(
            level,
            segments = segments.len(),
            ways = way_count,
            nodes = node_count,
            "traced level"
        );

        Ok(TracedLevel {
            polylines: ways,
            node_count,
            way_count,
        })
    }
}

/// Unique nodes in one polyline: the repeated endpoint of a closed ring is
/// a single node.
fn unique_nodes(polyline: &[Point]) -> u64 {
    if polyline.is_empty() {
        return 0;
    }
    if is_closed(polyline) {
        (polyline.len() - 1) as u64
    } else {
        polyline.len() as u64
    }
}

/// Keep maximal runs of vertices inside the clip polygon. An open line may
/// split into several retained pieces; geometry wholly outside is dropped.
fn clip_polyline(polyline: &[Point], polygon: &ClipPolygon) -> Vec<Polyline> {
    let mut pieces = Vec::new();
    let mut current: Polyline = Vec::new();

    for &p in polyline {
        if polygon.contains(p.x, p.y) {
            current.push(p);
        } else if current.len() >= 2 {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }
    }
    if current.len() >= 2 {
        pieces.push(current);
    }

    pieces
}

/// Split a polyline into ways of at most `max_nodes` points. Consecutive
/// chunks share their boundary point, so the unique-node total is
/// unchanged by splitting.
fn split_way(polyline: Polyline, max_nodes: u64) -> Vec<Polyline> {
    let max = max_nodes as usize;
    if max < 2 || polyline.len() <= max {
        if polyline.is_empty() {
            return vec![];
        }
        return vec![polyline];
    }

    let mut ways = Vec::new();
    let mut start = 0;
    while start + 1 < polyline.len() {
        let end = (start + max).min(polyline.len());
        ways.push(polyline[start..end].to_vec());
        start = end - 1;
    }
    ways
}
