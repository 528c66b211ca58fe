//! Marching squares over a scalar field, plus segment linking.

use crate::field::ScalarField;

/// A point in native (pre-transform) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// An ordered run of points. Closed when the first and last point are equal.
pub type Polyline = Vec<Point>;

/// Check whether a polyline is a closed ring (first point repeated at the end).
pub fn is_closed(polyline: &[Point]) -> bool {
    polyline.len() > 3 && polyline.first() == polyline.last()
}

/// Extract the level-set segments of `field` at `level`.
///
/// Cells with any `NaN` corner are skipped, which is how the validity mask
/// reaches the tracer. Crossing positions are linearly interpolated along
/// cell edges in the field's own coordinate space.
pub fn march_squares(field: &ScalarField, level: f64) -> Vec<Segment> {
    let rows = field.rows();
    let cols = field.cols();
    if rows < 2 || cols < 2 {
        return vec![];
    }

    let mut segments = Vec::new();

    for row in 0..(rows - 1) {
        for col in 0..(cols - 1) {
            let tl = field.value(row, col);
            let tr = field.value(row, col + 1);
            let bl = field.value(row + 1, col);
            let br = field.value(row + 1, col + 1);

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            let x0 = field.x(col);
            let x1 = field.x(col + 1);
            let y0 = field.y(row);
            let y1 = field.y(row + 1);

            let top = interpolate_edge(x0, y0, x1, y0, tl, tr, level);
            let right = interpolate_edge(x1, y0, x1, y1, tr, br, level);
            let bottom = interpolate_edge(x0, y1, x1, y1, bl, br, level);
            let left = interpolate_edge(x0, y0, x0, y1, tl, bl, level);

            match cell_index {
                0 | 15 => {}
                1 | 14 => segments.push(Segment { start: left, end: top }),
                2 | 13 => segments.push(Segment { start: top, end: right }),
                3 | 12 => segments.push(Segment { start: left, end: right }),
                4 | 11 => segments.push(Segment { start: right, end: bottom }),
                5 => {
                    // Saddle: two separate crossings.
                    segments.push(Segment { start: left, end: top });
                    segments.push(Segment { start: right, end: bottom });
                }
                6 | 9 => segments.push(Segment { start: top, end: bottom }),
                7 | 8 => segments.push(Segment { start: left, end: bottom }),
                10 => {
                    segments.push(Segment { start: top, end: right });
                    segments.push(Segment { start: left, end: bottom });
                }
                _ => unreachable!(),
            }
        }
    }

    // A corner sitting exactly on the level collapses both edge crossings
    // onto that corner; the resulting zero-length segment would become a
    // phantom two-point way.
    segments.retain(|s| point_key(s.start) != point_key(s.end));

    segments
}

/// Linearly interpolate the crossing position along one cell edge.
fn interpolate_edge(x1: f64, y1: f64, x2: f64, y2: f64, val1: f64, val2: f64, level: f64) -> Point {
    if (val2 - val1).abs() < 1e-12 {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Quantized endpoint key. Crossings on a shared cell edge are computed by
/// the identical arithmetic in both cells, so quantization only has to
/// absorb the last ulp.
fn point_key(p: Point) -> (i64, i64) {
    const SCALE: f64 = 1e9;
    ((p.x * SCALE).round() as i64, (p.y * SCALE).round() as i64)
}

/// Connect unordered segments into continuous polylines.
///
/// Chains are extended from both ends; a chain whose ends meet becomes a
/// closed ring with its first point repeated at the end.
pub fn link_segments(segments: &[Segment]) -> Vec<Polyline> {
    use std::collections::HashMap;

    if segments.is_empty() {
        return vec![];
    }

    // Endpoint index: key -> segments touching that point.
    let mut index: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        index.entry(point_key(seg.start)).or_default().push(i);
        index.entry(point_key(seg.end)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;

        let mut points = vec![segments[start_idx].start, segments[start_idx].end];
        extend_chain(&mut points, segments, &index, &mut used);

        // Grow the other direction: reverse, extend, restore orientation.
        points.reverse();
        extend_chain(&mut points, segments, &index, &mut used);
        points.reverse();

        if points.len() >= 2 {
            // Normalize closed rings to an exact first == last repeat.
            if points.len() > 3 && point_key(points[0]) == point_key(*points.last().unwrap()) {
                let first = points[0];
                *points.last_mut().unwrap() = first;
            }
            polylines.push(points);
        }
    }

    polylines
}

fn extend_chain(
    points: &mut Vec<Point>,
    segments: &[Segment],
    index: &std::collections::HashMap<(i64, i64), Vec<usize>>,
    used: &mut [bool],
) {
    loop {
        let head_key = point_key(*points.last().unwrap());
        let start_key = point_key(points[0]);
        if points.len() > 2 && head_key == start_key {
            break; // ring closed
        }

        let Some(candidates) = index.get(&head_key) else {
            break;
        };
        let mut extended = false;
        for &i in candidates {
            if used[i] {
                continue;
            }
            let seg = &segments[i];
            if point_key(seg.start) == head_key {
                points.push(seg.end);
            } else {
                points.push(seg.start);
            }
            used[i] = true;
            extended = true;
            break;
        }
        if !extended {
            break;
        }
    }
}
