//! Greedy nearest-neighbour ordering to cut pen-up travel

use crate::geometry::{Path, Point};

/// Reorders paths into a nearest-neighbour tour starting at the origin.
///
/// At each step the remaining path with the closest start or end wins; an end wins by
/// reversing the path. Ties go to the first path in list order, and for one path the
/// start is checked before the end. The pen then moves to where the chosen path lifts:
/// its last point, or its first point when closed.
pub fn order_paths(paths: &[Path]) -> Vec<Path> {
    let mut remaining: Vec<&Path> = paths.iter().collect();
    let mut ordered = Vec::with_capacity(paths.len());
    let mut pen = Point::ZERO;

    while !remaining.is_empty() {
        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        let mut best_reversed = false;

        for (index, path) in remaining.iter().enumerate() {
            let (Some(start), Some(end)) = (path.start(), path.end()) else {
                continue;
            };
            let to_start = pen.distance(start);
            if to_start < best_distance {
                best_distance = to_start;
                best_index = index;
                best_reversed = false;
            }
            let to_end = pen.distance(end);
            if to_end < best_distance {
                best_distance = to_end;
                best_index = index;
                best_reversed = true;
            }
        }

        let chosen = remaining.remove(best_index);
        let path = if best_reversed {
            chosen.reversed()
        } else {
            chosen.clone()
        };
        if let Some(exit) = path.exit_point() {
            pen = exit;
        }
        ordered.push(path);
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_path_first() {
        let ordered = order_paths(&[
            Path::from_coords(&[(10.0, 0.0), (10.0, 5.0)]),
            Path::from_coords(&[(0.0, 0.0), (0.0, 5.0)]),
        ]);
        assert_eq!(ordered[0].start(), Some(Point::new(0.0, 0.0)));
        assert_eq!(ordered[1].start(), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_reverses_when_end_is_closer() {
        let ordered = order_paths(&[
            Path::from_coords(&[(0.0, 0.0), (0.0, 5.0)]),
            Path::from_coords(&[(20.0, 20.0), (1.0, 5.0)]),
        ]);
        assert_eq!(ordered[1].points, vec![Point::new(1.0, 5.0), Point::new(20.0, 20.0)]);
    }

    #[test]
    fn test_ties_keep_list_order() {
        let ordered = order_paths(&[
            Path::from_coords(&[(3.0, 4.0), (30.0, 40.0)]),
            Path::from_coords(&[(4.0, 3.0), (40.0, 30.0)]),
        ]);
        assert_eq!(ordered[0].start(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_start_wins_over_equal_end() {
        // both ends are 5 from the origin
        let ordered = order_paths(&[Path::from_coords(&[(3.0, 4.0), (1.0, 9.0), (4.0, 3.0)])]);
        assert_eq!(ordered[0].start(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_closed_path_lifts_at_start() {
        let ring = Path::closed(vec![Point::new(1.0, 0.0), Point::new(50.0, 0.0), Point::new(50.0, 50.0)]);
        let ordered = order_paths(&[
            Path::from_coords(&[(52.0, 50.0), (60.0, 60.0)]),
            ring,
            Path::from_coords(&[(2.0, 0.0), (2.0, 5.0)]),
        ]);
        assert!(ordered[0].closed);
        assert_eq!(ordered[1].start(), Some(Point::new(2.0, 0.0)));
    }

    #[test]
    fn test_keeps_every_path() {
        let paths: Vec<Path> = (0..10)
            .map(|i| Path::from_coords(&[(i as f64 * 7.0 % 13.0, 0.0), (i as f64, 3.0)]))
            .collect();
        assert_eq!(order_paths(&paths).len(), paths.len());
    }
}
