//! Ramer-Douglas-Peucker polyline simplification

use crate::geometry::{perpendicular_distance, Path, Point};

/// Keeps the points that deviate more than `tolerance` from the chord of their span.
///
/// Endpoints always survive. On ties the first point of maximum distance is kept.
/// Reapplying with the same tolerance returns the input unchanged.
pub fn simplify_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let tolerance = tolerance.max(0.0);
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    // explicit stack; spans are independent so visiting order does not matter
    let mut spans = vec![(0, last)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }
        let (a, b) = (points[start], points[end]);
        let mut max_distance = 0.0;
        let mut index = start;
        for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
            let distance = perpendicular_distance(*point, a, b);
            if distance > max_distance {
                max_distance = distance;
                index = i;
            }
        }
        if max_distance > tolerance {
            keep[index] = true;
            spans.push((start, index));
            spans.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

/// Simplifies one path; `None` when fewer than two points remain
pub fn simplify_path(path: &Path, tolerance: f64) -> Option<Path> {
    let points = simplify_points(&path.points, tolerance);
    if points.len() < 2 {
        return None;
    }
    Some(Path {
        points,
        closed: path.closed,
    })
}

pub fn simplify_paths(paths: &[Path], tolerance: f64) -> Vec<Path> {
    paths
        .iter()
        .filter_map(|path| simplify_path(path, tolerance))
        .collect()
}
