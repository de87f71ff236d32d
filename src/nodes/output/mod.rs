//! Output nodes: the points where graph results become pen layers

use std::collections::BTreeMap;

use crate::constants::output::{DEFAULT_COLOR, DEFAULT_PEN};
use crate::geometry::{OutputLayer, Path};
use crate::nodes::cache::NodeResult;
use crate::nodes::factory::{DataType, NodeCategory, NodeDefinition, ParameterDefinition, PortDefinition};
use crate::nodes::interface::{NodeData, NodeOutputs};

pub const OUTPUT_NODE_TYPE: &str = "output";

pub fn output_definition() -> NodeDefinition {
    NodeDefinition::new(OUTPUT_NODE_TYPE, "Output", NodeCategory::output(), "Send paths to a plotter pen")
        .with_inputs(vec![PortDefinition::optional("paths", DataType::Paths)])
        .with_outputs(vec![PortDefinition::required("paths", DataType::Paths)])
        .with_parameters(vec![
            ParameterDefinition::text("name", "Name", ""),
            ParameterDefinition::text("color", "Color", DEFAULT_COLOR),
            ParameterDefinition::number("pen", "Pen", DEFAULT_PEN as f64)
                .with_range(1.0, 16.0)
                .with_step(1.0),
            ParameterDefinition::boolean("enabled", "Enabled", true),
        ])
}

/// Passes the incoming layers through unchanged
pub fn execute_output(inputs: &BTreeMap<String, NodeData>) -> NodeOutputs {
    let layers = inputs
        .get("paths")
        .and_then(NodeData::as_layers)
        .map(<[_]>::to_vec)
        .unwrap_or_default();
    NodeOutputs::single("paths", NodeData::Paths(layers))
}

/// Pen number from a raw parameter value: rounded, at least 1
pub fn pen_number(value: f64) -> u32 {
    // NaN falls through max() to the lower bound
    value.round().max(1.0) as u32
}

/// Flattens an executed output node into one pen layer, dropping degenerate paths
pub fn output_layer(node_id: &str, result: &NodeResult) -> OutputLayer {
    let params = &result.parameters;
    let pen = pen_number(params.number("pen"));
    let paths: Vec<Path> = result
        .outputs
        .get("paths")
        .and_then(NodeData::as_layers)
        .unwrap_or_default()
        .iter()
        .flat_map(|layer| layer.paths.iter())
        .filter(|path| !path.is_degenerate())
        .cloned()
        .collect();

    let mut layer = OutputLayer::new(node_id, pen).with_paths(paths);
    let name = params.text("name");
    if !name.is_empty() {
        layer.name = name.to_string();
    }
    let color = params.text("color");
    if !color.is_empty() {
        layer.color = color.to_string();
    }
    layer.enabled = params.boolean("enabled");
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Layer;

    #[test]
    fn test_pen_number() {
        assert_eq!(pen_number(2.4), 2);
        assert_eq!(pen_number(2.6), 3);
        assert_eq!(pen_number(0.0), 1);
        assert_eq!(pen_number(-3.0), 1);
        assert_eq!(pen_number(f64::NAN), 1);
    }

    #[test]
    fn test_output_layer_flattens_and_drops_degenerate() {
        let layers = vec![
            Layer::new("a", vec![Path::from_coords(&[(0.0, 0.0), (1.0, 0.0)])]),
            Layer::new("b", vec![Path::from_coords(&[(5.0, 5.0)]), Path::from_coords(&[(2.0, 0.0), (3.0, 0.0)])]),
        ];
        let mut inputs = BTreeMap::new();
        inputs.insert("paths".to_string(), NodeData::Paths(layers));
        let result = NodeResult {
            outputs: execute_output(&inputs),
            parameters: output_definition()
                .resolve_parameters(&Default::default())
                .with("pen", 3.0)
                .with("name", "Fine liner")
                .with("color", "#3366ff"),
        };

        let layer = output_layer("out", &result);
        assert_eq!(layer.id, "out");
        assert_eq!(layer.pen, 3);
        assert_eq!(layer.name, "Fine liner");
        assert_eq!(layer.color, "#3366ff");
        assert!(layer.enabled);
        assert_eq!(layer.paths.len(), 2);
    }

    #[test]
    fn test_unnamed_output_is_named_after_pen() {
        let result = NodeResult {
            outputs: execute_output(&BTreeMap::new()),
            parameters: output_definition()
                .resolve_parameters(&Default::default())
                .with("pen", 2.0),
        };
        let layer = output_layer("out", &result);
        assert_eq!(layer.name, "Pen 2");
        assert_eq!(layer.color, DEFAULT_COLOR);
        assert!(layer.paths.is_empty());
    }
}
