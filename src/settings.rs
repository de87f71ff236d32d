//! User-facing configuration records

use serde::{Deserialize, Serialize};

use crate::constants::optimize::{
    DEFAULT_FLATTEN_TOLERANCE, DEFAULT_JOIN_TOLERANCE, DEFAULT_PLOT_SPEED, DEFAULT_SIMPLIFY_TOLERANCE,
};

/// Toggles and tolerances for the plot optimization pipeline, all in millimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationSettings {
    pub simplify_enabled: bool,
    pub simplify_tolerance: f64,
    pub join_enabled: bool,
    pub join_tolerance: f64,
    pub order_enabled: bool,
    pub flatten_tolerance: f64,
    /// Pen speed in mm/s, used for time estimates
    pub plot_speed: f64,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            simplify_enabled: true,
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
            join_enabled: true,
            join_tolerance: DEFAULT_JOIN_TOLERANCE,
            order_enabled: true,
            flatten_tolerance: DEFAULT_FLATTEN_TOLERANCE,
            plot_speed: DEFAULT_PLOT_SPEED,
        }
    }
}

impl OptimizationSettings {
    /// All stages switched off; paths pass through untouched
    pub fn disabled() -> Self {
        Self {
            simplify_enabled: false,
            join_enabled: false,
            order_enabled: false,
            ..Self::default()
        }
    }
}

/// Options accepted by the SVG importer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgImportOptions {
    /// Import `rect`, `circle`, `ellipse`, `line`, `polyline` and `polygon` as well as `path`
    pub convert_shapes: bool,
    /// Skip elements that are filled but have no stroke
    pub ignore_fills: bool,
    /// Apply element `transform` attributes to the geometry
    pub flatten_transforms: bool,
    /// Curve flattening tolerance in millimetres
    pub tolerance: f64,
}

impl Default for SvgImportOptions {
    fn default() -> Self {
        Self {
            convert_shapes: true,
            ignore_fills: false,
            flatten_transforms: true,
            tolerance: DEFAULT_FLATTEN_TOLERANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = OptimizationSettings::default();
        assert!(settings.simplify_enabled && settings.join_enabled && settings.order_enabled);
        assert_eq!(settings.simplify_tolerance, 0.1);
        assert_eq!(settings.join_tolerance, 0.5);
        assert_eq!(settings.flatten_tolerance, 0.2);
        assert_eq!(settings.plot_speed, 50.0);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: OptimizationSettings =
            serde_json::from_str(r#"{"join_enabled": false, "simplify_tolerance": 0.3}"#).unwrap();
        assert!(!settings.join_enabled);
        assert_eq!(settings.simplify_tolerance, 0.3);
        assert!(settings.order_enabled);

        let options: SvgImportOptions = serde_json::from_str(r#"{"ignore_fills": true}"#).unwrap();
        assert!(options.ignore_fills);
        assert!(options.convert_shapes && options.flatten_transforms);
    }
}
