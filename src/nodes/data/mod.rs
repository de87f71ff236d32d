//! Data nodes: literal values and external data sources

pub mod external;

pub use external::{DataFetcher, ExternalDataCache, SourceValues};

use crate::geometry::Point;
use crate::nodes::factory::{DataType, NodeCategory, NodeDefinition, ParameterDefinition, PortDefinition};
use crate::nodes::interface::{NodeData, NodeOutputs, Parameters};

pub const NUMBER_NODE_TYPE: &str = "number";
pub const VECTOR_NODE_TYPE: &str = "vector";
pub const BOOLEAN_NODE_TYPE: &str = "boolean";

fn value_node(node_type: &str, display_name: &str, data_type: DataType) -> NodeDefinition {
    NodeDefinition::new(node_type, display_name, NodeCategory::data(), "Constant value")
        .with_outputs(vec![PortDefinition::required("value", data_type)])
}

pub fn number_definition() -> NodeDefinition {
    value_node(NUMBER_NODE_TYPE, "Number", DataType::Number)
        .with_parameters(vec![ParameterDefinition::number("value", "Value", 0.0)])
}

pub fn vector_definition() -> NodeDefinition {
    value_node(VECTOR_NODE_TYPE, "Vector", DataType::Vector).with_parameters(vec![
        ParameterDefinition::number("x", "X", 0.0),
        ParameterDefinition::number("y", "Y", 0.0),
    ])
}

pub fn boolean_definition() -> NodeDefinition {
    value_node(BOOLEAN_NODE_TYPE, "Boolean", DataType::Boolean)
        .with_parameters(vec![ParameterDefinition::boolean("value", "Value", false)])
}

pub fn execute_number(params: &Parameters) -> NodeOutputs {
    NodeOutputs::single("value", NodeData::Number(params.number("value")))
}

pub fn execute_vector(params: &Parameters) -> NodeOutputs {
    let point = Point::new(params.number("x"), params.number("y"));
    NodeOutputs::single("value", NodeData::Vector(point))
}

pub fn execute_boolean(params: &Parameters) -> NodeOutputs {
    NodeOutputs::single("value", NodeData::Boolean(params.boolean("value")))
}
