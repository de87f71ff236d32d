//! Joining paths whose endpoints meet

use crate::geometry::{Path, Point};

/// Merges open paths whose endpoints lie within `tolerance` of each other.
///
/// Paths are taken in order. Each one keeps absorbing the first remaining candidate that
/// touches it, trying end-to-start, end-to-end, start-to-end and start-to-start, until
/// nothing touches. A result with at least three points whose own ends meet is marked
/// closed and loses its duplicated last point. Closed and degenerate inputs are never
/// merged into anything; closed ones pass through and degenerate ones are dropped.
pub fn join_paths(paths: &[Path], tolerance: f64) -> Vec<Path> {
    let tolerance = tolerance.max(0.0);
    let mut remaining: Vec<Path> = paths.iter().filter(|p| !p.is_degenerate()).cloned().collect();
    let mut joined = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut current = remaining.remove(0);
        if current.closed {
            joined.push(current);
            continue;
        }

        while let Some(index) = absorb_next(&mut current, &remaining, tolerance) {
            remaining.remove(index);
        }
        close_if_touching(&mut current, tolerance);
        joined.push(current);
    }
    joined
}

/// Appends or prepends the first touching candidate; returns its index
fn absorb_next(current: &mut Path, candidates: &[Path], tolerance: f64) -> Option<usize> {
    let (start, end) = (current.start()?, current.end()?);
    let touches = |a: Point, b: Point| a.distance(b) <= tolerance;

    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.closed {
            continue;
        }
        let (Some(other_start), Some(other_end)) = (candidate.start(), candidate.end()) else {
            continue;
        };
        let points = &candidate.points;

        if touches(end, other_start) {
            current.points.extend_from_slice(&points[1..]);
        } else if touches(end, other_end) {
            current.points.extend(points[..points.len() - 1].iter().rev());
        } else if touches(start, other_end) {
            let mut merged = points[..points.len() - 1].to_vec();
            merged.extend_from_slice(&current.points);
            current.points = merged;
        } else if touches(start, other_start) {
            let mut merged: Vec<Point> = points[1..].iter().rev().copied().collect();
            merged.extend_from_slice(&current.points);
            current.points = merged;
        } else {
            continue;
        }
        return Some(index);
    }
    None
}

fn close_if_touching(path: &mut Path, tolerance: f64) {
    if path.points.len() < 3 {
        return;
    }
    if let (Some(start), Some(end)) = (path.start(), path.end()) {
        if start.distance(end) <= tolerance {
            path.closed = true;
            path.points.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(path: &Path) -> Vec<(f64, f64)> {
        path.points.iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn test_end_to_start() {
        let joined = join_paths(
            &[
                Path::from_coords(&[(0.0, 0.0), (5.0, 0.0)]),
                Path::from_coords(&[(5.0, 0.0), (5.0, 5.0)]),
            ],
            0.0,
        );
        assert_eq!(joined.len(), 1);
        assert!(!joined[0].closed);
        assert_eq!(coords(&joined[0]), vec![(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
    }

    #[test]
    fn test_back_and_forth_closes() {
        let joined = join_paths(
            &[
                Path::from_coords(&[(0.0, 0.0), (5.0, 0.0)]),
                Path::from_coords(&[(5.0, 0.0), (0.0, 0.0)]),
            ],
            0.0,
        );
        assert_eq!(joined.len(), 1);
        assert!(joined[0].closed);
        assert_eq!(coords(&joined[0]), vec![(0.0, 0.0), (5.0, 0.0)]);
    }

    #[test]
    fn test_all_orientations() {
        let base = || Path::from_coords(&[(0.0, 0.0), (1.0, 0.0)]);

        let end_to_end = join_paths(&[base(), Path::from_coords(&[(1.0, 5.0), (1.0, 0.0)])], 0.0);
        assert_eq!(coords(&end_to_end[0]), vec![(0.0, 0.0), (1.0, 0.0), (1.0, 5.0)]);

        let start_to_end = join_paths(&[base(), Path::from_coords(&[(-3.0, 0.0), (0.0, 0.0)])], 0.0);
        assert_eq!(coords(&start_to_end[0]), vec![(-3.0, 0.0), (0.0, 0.0), (1.0, 0.0)]);

        let start_to_start = join_paths(&[base(), Path::from_coords(&[(0.0, 0.0), (0.0, 4.0)])], 0.0);
        assert_eq!(coords(&start_to_start[0]), vec![(0.0, 4.0), (0.0, 0.0), (1.0, 0.0)]);
    }

    #[test]
    fn test_tolerance_and_chains() {
        let joined = join_paths(
            &[
                Path::from_coords(&[(0.0, 0.0), (10.0, 0.0)]),
                Path::from_coords(&[(20.0, 0.2), (30.0, 0.0)]),
                Path::from_coords(&[(10.3, 0.0), (20.0, 0.0)]),
            ],
            0.5,
        );
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].len(), 4);
        assert_eq!(joined[0].end(), Some(Point::new(30.0, 0.0)));
    }

    #[test]
    fn test_far_apart_and_closed_paths_stay_separate() {
        let ring = Path::closed(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)]);
        let joined = join_paths(
            &[
                ring.clone(),
                Path::from_coords(&[(0.0, 0.0), (-5.0, 0.0)]),
                Path::from_coords(&[(50.0, 50.0), (60.0, 60.0)]),
                Path::from_coords(&[(7.0, 7.0)]),
            ],
            0.5,
        );
        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0], ring);
    }

    #[test]
    fn test_square_from_four_segments_closes() {
        let joined = join_paths(
            &[
                Path::from_coords(&[(0.0, 0.0), (10.0, 0.0)]),
                Path::from_coords(&[(10.0, 0.0), (10.0, 10.0)]),
                Path::from_coords(&[(10.0, 10.0), (0.0, 10.0)]),
                Path::from_coords(&[(0.0, 10.0), (0.0, 0.0)]),
            ],
            0.1,
        );
        assert_eq!(joined.len(), 1);
        assert!(joined[0].closed);
        assert_eq!(joined[0].len(), 4);
    }
}
