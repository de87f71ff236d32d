//! Lookup table from node type tag to definition and execution capability

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::GraphError;
use crate::nodes::data::{self, DataFetcher};
use crate::nodes::factory::NodeDefinition;
use crate::nodes::{math, output, utility};
use crate::plugins::{builtin_plugins, NodePlugin};

/// How a registered node type executes
#[derive(Clone)]
pub enum NodeKind {
    Number,
    Vector,
    Boolean,
    Math,
    Range,
    Merge,
    Output,
    Plugin(Arc<dyn NodePlugin>),
    DataSource(Arc<dyn DataFetcher>),
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Number => "Number",
            NodeKind::Vector => "Vector",
            NodeKind::Boolean => "Boolean",
            NodeKind::Math => "Math",
            NodeKind::Range => "Range",
            NodeKind::Merge => "Merge",
            NodeKind::Output => "Output",
            NodeKind::Plugin(_) => "Plugin",
            NodeKind::DataSource(_) => "DataSource",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredNode {
    pub definition: NodeDefinition,
    pub kind: NodeKind,
}

/// Registered node types, keyed by type tag.
///
/// Lookups never depend on registration order; registering a tag twice is rejected.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<String, RegisteredNode>,
}

impl NodeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Value, math, merge and output nodes plus the reference plugins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins = [
            (data::number_definition(), NodeKind::Number),
            (data::vector_definition(), NodeKind::Vector),
            (data::boolean_definition(), NodeKind::Boolean),
            (math::math_definition(), NodeKind::Math),
            (math::range_definition(), NodeKind::Range),
            (utility::merge_definition(), NodeKind::Merge),
            (output::output_definition(), NodeKind::Output),
        ];
        for (definition, kind) in builtins {
            registry.insert(definition, kind);
        }
        for plugin in builtin_plugins() {
            registry.insert(plugin.definition(), NodeKind::Plugin(plugin));
        }
        registry
    }

    fn insert(&mut self, definition: NodeDefinition, kind: NodeKind) {
        self.nodes
            .insert(definition.node_type.clone(), RegisteredNode { definition, kind });
    }

    pub fn register(&mut self, definition: NodeDefinition, kind: NodeKind) -> Result<(), GraphError> {
        if self.nodes.contains_key(&definition.node_type) {
            return Err(GraphError::DuplicateNodeType(definition.node_type));
        }
        self.insert(definition, kind);
        Ok(())
    }

    pub fn register_plugin(&mut self, plugin: Arc<dyn NodePlugin>) -> Result<(), GraphError> {
        self.register(plugin.definition(), NodeKind::Plugin(plugin))
    }

    pub fn register_data_source(&mut self, fetcher: Arc<dyn DataFetcher>) -> Result<(), GraphError> {
        self.register(fetcher.definition(), NodeKind::DataSource(fetcher))
    }

    pub fn get(&self, node_type: &str) -> Option<&RegisteredNode> {
        self.nodes.get(node_type)
    }

    pub fn definition(&self, node_type: &str) -> Option<&NodeDefinition> {
        self.nodes.get(node_type).map(|node| &node.definition)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.nodes.contains_key(node_type)
    }

    /// All definitions, ordered by type tag
    pub fn definitions(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.values().map(|node| &node.definition)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::TransformPlugin;

    #[test]
    fn test_builtins_are_registered() {
        let registry = NodeRegistry::with_builtins();
        for node_type in [
            "number",
            "vector",
            "boolean",
            "math",
            "range",
            "merge",
            "output",
            "svg_import",
            "transform",
            "clip",
            "displace",
        ] {
            assert!(registry.contains(node_type), "missing {}", node_type);
        }
        assert!(matches!(registry.get("output").unwrap().kind, NodeKind::Output));
        assert!(matches!(registry.get("clip").unwrap().kind, NodeKind::Plugin(_)));
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let mut registry = NodeRegistry::with_builtins();
        let before = registry.len();
        let result = registry.register_plugin(Arc::new(TransformPlugin));
        assert_eq!(result, Err(GraphError::DuplicateNodeType("transform".into())));
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_definitions_are_sorted_by_type() {
        let mut registry = NodeRegistry::new();
        registry.register_plugin(Arc::new(TransformPlugin)).unwrap();
        registry
            .register(math::math_definition(), NodeKind::Math)
            .unwrap();
        let types: Vec<&str> = registry.definitions().map(|d| d.node_type.as_str()).collect();
        assert_eq!(types, vec!["math", "transform"]);
        assert_eq!(format!("{:?}", registry.get("math").unwrap().kind), "Math");
    }
}
