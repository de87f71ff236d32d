//! Affine transform modifier

use log::debug;

use super::{map_paths, ExecutionContext, NodePlugin};
use crate::error::PluginError;
use crate::geometry::{Layer, Point};
use crate::nodes::factory::{NodeDefinition, ParameterDefinition};
use crate::nodes::interface::Parameters;

/// Scales, rotates and then translates paths about the canvas centre
pub struct TransformPlugin;

impl NodePlugin for TransformPlugin {
    fn definition(&self) -> NodeDefinition {
        NodeDefinition::modifier("transform", "Transform", "Translate, rotate and scale paths")
            .with_parameters(vec![
                ParameterDefinition::number("translate_x", "Translate X", 0.0).with_step(1.0),
                ParameterDefinition::number("translate_y", "Translate Y", 0.0).with_step(1.0),
                ParameterDefinition::number("rotation", "Rotation", 0.0).with_range(-360.0, 360.0),
                ParameterDefinition::number("scale_x", "Scale X", 1.0).with_step(0.01),
                ParameterDefinition::number("scale_y", "Scale Y", 1.0).with_step(0.01),
            ])
    }

    fn execute(
        &self,
        params: &Parameters,
        inputs: &[Layer],
        context: &mut ExecutionContext,
    ) -> Result<Vec<Layer>, PluginError> {
        let center = context.canvas.center();
        let offset = Point::new(params.number("translate_x"), params.number("translate_y"));
        let angle = params.number("rotation").to_radians();
        let (sx, sy) = (params.number("scale_x"), params.number("scale_y"));
        debug!("transform {}: offset {:?} angle {} scale {}x{}", context.instance_id, offset, angle, sx, sy);

        Ok(map_paths(inputs, |path| {
            let mut path = path.clone();
            path.scale(sx, sy, center);
            path.rotate(angle, center);
            path.translate(offset);
            vec![path]
        }))
    }
}
