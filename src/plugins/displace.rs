//! Noise displacement modifier

use super::{map_paths, ExecutionContext, NodePlugin};
use crate::error::PluginError;
use crate::geometry::{noise2, resample, Layer, Point};
use crate::nodes::factory::{NodeDefinition, ParameterDefinition};
use crate::nodes::interface::Parameters;

// decorrelates the y field from the x field
const Y_FIELD_OFFSET: Point = Point::new(31.7, 47.3);

/// Resamples paths and pushes every point along a seeded 2D noise field
pub struct DisplacePlugin;

impl NodePlugin for DisplacePlugin {
    fn definition(&self) -> NodeDefinition {
        NodeDefinition::modifier("displace", "Displace", "Wobble paths with coherent noise")
            .with_parameters(vec![
                ParameterDefinition::number("amount", "Amount", 2.0).with_range(0.0, 50.0),
                ParameterDefinition::number("frequency", "Frequency", 0.05)
                    .with_range(0.001, 1.0)
                    .with_step(0.001),
                ParameterDefinition::number("seed_offset", "Seed Offset", 0.0).with_step(1.0),
                ParameterDefinition::number("resolution", "Resolution", 1.0).with_range(0.1, 20.0),
            ])
    }

    fn execute(
        &self,
        params: &Parameters,
        inputs: &[Layer],
        context: &mut ExecutionContext,
    ) -> Result<Vec<Layer>, PluginError> {
        let resolution = params.number("resolution");
        if resolution <= 0.0 {
            return Err(PluginError::InvalidParameter {
                name: "resolution".into(),
                reason: format!("must be positive, got {}", resolution),
            });
        }
        let amount = params.number("amount");
        let frequency = params.number("frequency");
        let seed = (context.seed as i32).wrapping_add(params.number("seed_offset").round() as i32);

        Ok(map_paths(inputs, |path| {
            let mut path = resample(path, resolution);
            for point in &mut path.points {
                let sample = *point * frequency;
                let offset = Point::new(
                    noise2(sample.x, sample.y, seed),
                    noise2(sample.x + Y_FIELD_OFFSET.x, sample.y + Y_FIELD_OFFSET.y, seed),
                );
                *point += offset * amount;
            }
            vec![path]
        }))
    }
}
