//! Ramer-Douglas-Peucker polyline simplification.

use crate::march::Point;

/// Simplify a polyline, keeping every point farther than `epsilon` from the
/// chord of its enclosing span. Endpoints are always preserved, so closed
/// rings stay closed.
pub fn simplify_rdp(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = first;
        for i in (first + 1)..last {
            let dist = perpendicular_distance(points[i], points[first], points[last]);
            if dist > max_dist {
                max_dist = dist;
                max_idx = i;
            }
        }

        if max_dist > epsilon {
            keep[max_idx] = true;
            stack.push((first, max_idx));
            stack.push((max_idx, last));
        }
    }

    points
        .iter()
        .zip(keep.iter())
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Distance from `p` to the line through `a` and `b`. Falls back to the
/// distance to `a` when the chord is degenerate.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < 1e-24 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    (dy * p.x - dx * p.y + b.x * a.y - b.y * a.x).abs() / len_sq.sqrt()
}
