//! SVG file generator

use std::fs;
use std::path::PathBuf;

use log::info;

use super::{ExecutionContext, NodePlugin};
use crate::constants::geometry::EPSILON;
use crate::error::PluginError;
use crate::geometry::{Layer, Path, Rect};
use crate::nodes::factory::{NodeDefinition, ParameterDefinition};
use crate::nodes::interface::Parameters;
use crate::settings::SvgImportOptions;
use crate::svg::import_svg;

/// Loads an SVG file from disk and emits its flattened paths as one layer
pub struct SvgImportPlugin;

impl NodePlugin for SvgImportPlugin {
    fn definition(&self) -> NodeDefinition {
        NodeDefinition::generator("svg_import", "SVG Import", "Paths from an SVG file").with_parameters(vec![
            ParameterDefinition::file("file", "File"),
            ParameterDefinition::boolean("ignore_fills", "Ignore Fills", false),
            ParameterDefinition::boolean("fit_to_canvas", "Fit to Canvas", true),
            ParameterDefinition::number("margin", "Margin", 10.0)
                .with_range(0.0, 100.0)
                .with_show_when("fit_to_canvas", true),
            ParameterDefinition::number("tolerance", "Curve Tolerance", 0.2).with_range(0.01, 2.0),
        ])
    }

    fn execute(
        &self,
        params: &Parameters,
        _inputs: &[Layer],
        context: &mut ExecutionContext,
    ) -> Result<Vec<Layer>, PluginError> {
        let file = params.text("file");
        if file.is_empty() {
            return Ok(Vec::new());
        }
        let path = PathBuf::from(file);
        let source = fs::read_to_string(&path).map_err(|source| PluginError::Io {
            path: path.clone(),
            source,
        })?;

        let options = SvgImportOptions {
            ignore_fills: params.boolean("ignore_fills"),
            tolerance: params.number("tolerance").max(EPSILON),
            ..SvgImportOptions::default()
        };
        let mut paths = import_svg(&source, &options).paths;
        info!("imported {} paths from {}", paths.len(), path.display());

        if params.boolean("fit_to_canvas") {
            let target = context.canvas.rect().inset(params.number("margin"));
            fit_into(&mut paths, &target);
        }
        Ok(vec![Layer::new(context.instance_id.clone(), paths)])
    }
}

/// Uniformly scales and centres `paths` so their bounding box fills `target`
fn fit_into(paths: &mut [Path], target: &Rect) {
    let Some(bounds) = paths
        .iter()
        .filter_map(Path::bounds)
        .reduce(|a, b| a.union(&b))
    else {
        return;
    };
    let (w, h) = (bounds.width(), bounds.height());
    let scale = match (w > EPSILON, h > EPSILON) {
        (true, true) => (target.width() / w).min(target.height() / h),
        (true, false) => target.width() / w,
        (false, true) => target.height() / h,
        (false, false) => 1.0,
    };
    let source_center = bounds.center();
    let target_center = target.center();
    for path in paths.iter_mut() {
        for point in &mut path.points {
            *point = target_center + (*point - source_center) * scale;
        }
    }
}
