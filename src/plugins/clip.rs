//! Canvas clipping modifier

use super::{map_paths, ExecutionContext, NodePlugin};
use crate::error::PluginError;
use crate::geometry::{clip_path_to_circle, clip_path_to_rect, Layer};
use crate::nodes::factory::{NodeDefinition, ParameterDefinition};
use crate::nodes::interface::Parameters;

/// Clips paths to the canvas rectangle inset by a margin, or to the inscribed circle
pub struct ClipPlugin;

impl NodePlugin for ClipPlugin {
    fn definition(&self) -> NodeDefinition {
        NodeDefinition::modifier("clip", "Clip", "Clip paths to the canvas").with_parameters(vec![
            ParameterDefinition::select("shape", "Shape", &["rectangle", "circle"], "rectangle"),
            ParameterDefinition::number("margin", "Margin", 10.0)
                .with_range(0.0, 200.0)
                .with_step(0.5),
        ])
    }

    fn execute(
        &self,
        params: &Parameters,
        inputs: &[Layer],
        context: &mut ExecutionContext,
    ) -> Result<Vec<Layer>, PluginError> {
        let margin = params.number("margin");
        if margin < 0.0 {
            return Err(PluginError::InvalidParameter {
                name: "margin".into(),
                reason: format!("must not be negative, got {}", margin),
            });
        }
        let region = context.canvas.rect().inset(margin);

        match params.text("shape") {
            "circle" => {
                let radius = region.width().min(region.height()) / 2.0;
                let center = region.center();
                Ok(map_paths(inputs, |path| clip_path_to_circle(path, center, radius)))
            }
            "rectangle" => Ok(map_paths(inputs, |path| clip_path_to_rect(path, &region))),
            other => Err(PluginError::InvalidParameter {
                name: "shape".into(),
                reason: format!("unknown shape '{}'", other),
            }),
        }
    }
}
