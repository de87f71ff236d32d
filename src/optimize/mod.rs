//! Plot optimization pipeline
//!
//! Turns evaluated pen layers into a shorter drawing sequence in three independently
//! switchable stages: simplify (RDP), join touching ends, then nearest-neighbour ordering.
//! Degenerate paths are dropped before any stage runs. Each layer is optimized on its own
//! since pens are plotted one after another.

pub mod join;
pub mod order;
pub mod simplify;
pub mod stats;

pub use join::join_paths;
pub use order::order_paths;
pub use simplify::{simplify_path, simplify_paths, simplify_points};
pub use stats::{compute_stats, PlotStats};

use log::info;
use serde::Serialize;

use crate::geometry::{OutputLayer, Path};
use crate::settings::OptimizationSettings;

/// Before and after statistics of one layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerReport {
    pub id: String,
    pub pen: u32,
    pub before: PlotStats,
    pub after: PlotStats,
}

/// Statistics of a whole optimization run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub layers: Vec<LayerReport>,
    pub before: PlotStats,
    pub after: PlotStats,
}

impl OptimizationReport {
    /// Travel saved by the run, in mm
    pub fn travel_saved(&self) -> f64 {
        self.before.travel_distance - self.after.travel_distance
    }
}

/// Runs the enabled stages over one set of paths
pub fn optimize_paths(paths: &[Path], settings: &OptimizationSettings) -> Vec<Path> {
    let mut paths: Vec<Path> = paths.iter().filter(|p| !p.is_degenerate()).cloned().collect();
    if settings.simplify_enabled {
        paths = simplify_paths(&paths, settings.simplify_tolerance);
    }
    if settings.join_enabled {
        paths = join_paths(&paths, settings.join_tolerance);
    }
    if settings.order_enabled {
        paths = order_paths(&paths);
    }
    paths
}

/// Optimizes every layer and reports per-layer and total statistics
pub fn run_pipeline(layers: &[OutputLayer], settings: &OptimizationSettings) -> (Vec<OutputLayer>, OptimizationReport) {
    let mut report = OptimizationReport::default();
    let mut optimized = Vec::with_capacity(layers.len());

    for layer in layers {
        let before = compute_stats(&layer.paths, settings.plot_speed);
        let paths = optimize_paths(&layer.paths, settings);
        let after = compute_stats(&paths, settings.plot_speed);

        report.before += before;
        report.after += after;
        report.layers.push(LayerReport {
            id: layer.id.clone(),
            pen: layer.pen,
            before,
            after,
        });
        optimized.push(OutputLayer {
            paths,
            ..layer.clone()
        });
    }

    info!(
        "optimized {} layers: {} -> {} paths, travel {:.1} -> {:.1} mm",
        layers.len(),
        report.before.path_count,
        report.after.path_count,
        report.before.travel_distance,
        report.after.travel_distance
    );
    (optimized, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn scattered() -> Vec<Path> {
        vec![
            Path::from_coords(&[(100.0, 0.0), (100.0, 50.0)]),
            Path::from_coords(&[(0.0, 0.0), (25.0, 0.0), (50.0, 0.0)]),
            Path::from_coords(&[(50.0, 0.0), (100.0, 0.0)]),
            Path::from_coords(&[(7.0, 7.0)]),
        ]
    }

    #[test]
    fn test_all_stages() {
        let paths = optimize_paths(&scattered(), &OptimizationSettings::default());
        assert_eq!(paths.len(), 1);
        // simplify runs before join, so the old joint at x=50 survives
        assert_eq!(
            paths[0].points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 50.0)
            ]
        );
    }

    #[test]
    fn test_disabled_stages_only_drop_degenerate() {
        let paths = optimize_paths(&scattered(), &OptimizationSettings::disabled());
        assert_eq!(paths, scattered()[..3].to_vec());
    }

    #[test]
    fn test_back_and_forth_join_keeps_draw_distance() {
        let strokes = vec![
            Path::from_coords(&[(0.0, 0.0), (5.0, 0.0)]),
            Path::from_coords(&[(5.0, 0.0), (0.0, 0.0)]),
        ];
        let layer = OutputLayer::new("out", 1).with_paths(strokes);
        let (layers, report) = run_pipeline(&[layer], &OptimizationSettings::default());

        assert_eq!(layers[0].paths.len(), 1);
        assert!(layers[0].paths[0].closed);
        assert_eq!(layers[0].paths[0].len(), 2);
        assert_eq!(report.before.draw_distance, 10.0);
        assert_eq!(report.after.draw_distance, 10.0);
    }

    #[test]
    fn test_report_per_layer() {
        let mut first = OutputLayer::new("a", 1).with_paths(scattered());
        first.color = "#ff0000".into();
        let second = OutputLayer::new("b", 2).with_paths(vec![Path::from_coords(&[(5.0, 5.0), (6.0, 6.0)])]);

        let (layers, report) = run_pipeline(&[first, second], &OptimizationSettings::default());
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].color, "#ff0000");
        assert_eq!(report.layers.len(), 2);
        assert_eq!(report.layers[0].before.path_count, 4);
        assert_eq!(report.layers[0].after.path_count, 1);
        assert_eq!(report.before.path_count, 5);
        assert_eq!(report.after.path_count, 2);
        assert!(report.travel_saved() > 0.0);
    }
}
