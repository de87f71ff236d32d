//! Graph node instances: a type tag plus the literal parameters stored for it

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::evaluation::PARAM_PORT_PREFIX;
use crate::nodes::interface::ParamValue;

/// Unique identifier for a node
pub type NodeId = String;

/// A node instance placed in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(default)]
    pub id: NodeId,
    /// Selects the registered definition this node executes
    #[serde(rename = "type")]
    pub node_type: String,
    /// Editor placement; never read during evaluation
    #[serde(default)]
    pub position: [f64; 2],
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
    /// Parameters rerouted to receive a connection on `param:<name>`
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub promoted: BTreeSet<String>,
}

impl GraphNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.into(),
            position: [0.0, 0.0],
            params: BTreeMap::new(),
            promoted: BTreeSet::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn with_promoted(mut self, name: &str) -> Self {
        self.promoted.insert(name.to_string());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = [x, y];
        self
    }

    pub fn is_promoted(&self, name: &str) -> bool {
        self.promoted.contains(name)
    }
}

/// Port name that feeds the promoted parameter `name`
pub fn param_port(name: &str) -> String {
    format!("{}{}", PARAM_PORT_PREFIX, name)
}

/// Parameter name behind a `param:<name>` port, if `port` is one
pub fn promoted_name(port: &str) -> Option<&str> {
    port.strip_prefix(PARAM_PORT_PREFIX)
}
