//! Draw and travel statistics for a sequence of paths

use std::ops::AddAssign;

use serde::Serialize;

use crate::constants::geometry::EPSILON;
use crate::geometry::{Path, Point};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlotStats {
    pub path_count: usize,
    pub point_count: usize,
    /// Pen-down distance in mm
    pub draw_distance: f64,
    /// Pen-up distance in mm, from the origin through every path in order
    pub travel_distance: f64,
    /// Seconds at the given plot speed; 0 when the speed is not positive
    pub estimated_time: f64,
}

impl PlotStats {
    pub fn total_distance(&self) -> f64 {
        self.draw_distance + self.travel_distance
    }
}

impl AddAssign for PlotStats {
    fn add_assign(&mut self, other: Self) {
        self.path_count += other.path_count;
        self.point_count += other.point_count;
        self.draw_distance += other.draw_distance;
        self.travel_distance += other.travel_distance;
        self.estimated_time += other.estimated_time;
    }
}

/// Statistics for drawing `paths` in order at `plot_speed` mm/s.
///
/// Closed paths include their closing segment and lift the pen at their first point.
pub fn compute_stats(paths: &[Path], plot_speed: f64) -> PlotStats {
    let mut stats = PlotStats {
        path_count: paths.len(),
        ..PlotStats::default()
    };
    let mut pen = Point::ZERO;
    for path in paths {
        let (Some(start), Some(exit)) = (path.start(), path.exit_point()) else {
            continue;
        };
        stats.point_count += path.len();
        stats.draw_distance += path.length();
        stats.travel_distance += pen.distance(start);
        pen = exit;
    }
    if plot_speed > EPSILON {
        stats.estimated_time = stats.total_distance() / plot_speed;
    }
    stats
}
