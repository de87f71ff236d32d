//! Utility nodes for combining path streams

use std::collections::BTreeMap;

use crate::constants::evaluation::MERGE_INPUT_COUNT;
use crate::nodes::factory::{DataType, NodeCategory, NodeDefinition, PortDefinition};
use crate::nodes::interface::{NodeData, NodeOutputs};

pub const MERGE_NODE_TYPE: &str = "merge";

/// Name of the merge node's `index`-th input, counted from 1
pub fn merge_port(index: usize) -> String {
    format!("paths_{}", index)
}

pub fn merge_definition() -> NodeDefinition {
    let inputs = (1..=MERGE_INPUT_COUNT)
        .map(|i| PortDefinition::optional(&merge_port(i), DataType::Paths))
        .collect();
    NodeDefinition::new(MERGE_NODE_TYPE, "Merge", NodeCategory::utility(), "Combine several path inputs")
        .with_inputs(inputs)
        .with_outputs(vec![PortDefinition::required("paths", DataType::Paths)])
}

/// Concatenates the layers of every connected input in port order
pub fn execute_merge(inputs: &BTreeMap<String, NodeData>) -> NodeOutputs {
    let layers = (1..=MERGE_INPUT_COUNT)
        .filter_map(|i| inputs.get(&merge_port(i)))
        .filter_map(NodeData::as_layers)
        .flat_map(|layers| layers.iter().cloned())
        .collect();
    NodeOutputs::single("paths", NodeData::Paths(layers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Layer, Path};

    fn layer(id: &str) -> NodeData {
        NodeData::Paths(vec![Layer::new(id, vec![Path::from_coords(&[(0.0, 0.0), (1.0, 1.0)])])])
    }

    #[test]
    fn test_merge_concatenates_in_port_order() {
        let mut inputs = BTreeMap::new();
        inputs.insert(merge_port(3), layer("c"));
        inputs.insert(merge_port(1), layer("a"));
        inputs.insert(merge_port(2), NodeData::Number(1.0));

        let outputs = execute_merge(&inputs);
        let layers = outputs.get("paths").and_then(NodeData::as_layers).unwrap();
        let ids: Vec<&str> = layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_merge_declares_four_inputs() {
        let definition = merge_definition();
        assert_eq!(definition.inputs.len(), MERGE_INPUT_COUNT);
        assert!(definition.input("paths_4").is_some());
    }
}
