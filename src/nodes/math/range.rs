//! Linear remapping of a number from one range into another

use crate::constants::geometry::EPSILON;
use crate::nodes::factory::{DataType, NodeCategory, NodeDefinition, ParameterDefinition, PortDefinition};
use crate::nodes::interface::{NodeData, NodeOutputs, Parameters};

pub const RANGE_NODE_TYPE: &str = "range";

/// Maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// A zero-width input range maps everything to `out_min`. With `clamp` the result is kept
/// within the output range, whichever way round it is given.
pub fn remap(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64, clamp: bool) -> f64 {
    let span = in_max - in_min;
    if span.abs() < EPSILON {
        return out_min;
    }
    let mapped = out_min + (value - in_min) / span * (out_max - out_min);
    if clamp {
        // min/max rather than clamp: bounds may be NaN when fed from other nodes
        mapped.max(out_min.min(out_max)).min(out_min.max(out_max))
    } else {
        mapped
    }
}

pub fn range_definition() -> NodeDefinition {
    NodeDefinition::new(RANGE_NODE_TYPE, "Range", NodeCategory::math(), "Remap a number between ranges")
        .with_outputs(vec![PortDefinition::required("result", DataType::Number)])
        .with_parameters(vec![
            ParameterDefinition::number("value", "Value", 0.0),
            ParameterDefinition::number("in_min", "Input Min", 0.0),
            ParameterDefinition::number("in_max", "Input Max", 1.0),
            ParameterDefinition::number("out_min", "Output Min", 0.0),
            ParameterDefinition::number("out_max", "Output Max", 1.0),
            ParameterDefinition::boolean("clamp", "Clamp", false),
        ])
}

pub fn execute_range(params: &Parameters) -> NodeOutputs {
    let result = remap(
        params.number("value"),
        params.number("in_min"),
        params.number("in_max"),
        params.number("out_min"),
        params.number("out_max"),
        params.boolean("clamp"),
    );
    NodeOutputs::single("result", NodeData::Number(result))
}
