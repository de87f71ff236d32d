//! Node graph data structures and structural edits

use serde::{Deserialize, Serialize};

use super::factory::DataType;
use super::node::{param_port, GraphNode, NodeId};
use crate::error::GraphError;
use crate::nodes::interface::ParamValue;

/// Directed edge from a named output port to a named input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from_node: NodeId,
    pub from_port: String,
    pub to_node: NodeId,
    pub to_port: String,
    pub data_type: DataType,
}

impl Connection {
    pub fn new(
        from_node: impl Into<NodeId>,
        from_port: impl Into<String>,
        to_node: impl Into<NodeId>,
        to_port: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            from_node: from_node.into(),
            from_port: from_port.into(),
            to_node: to_node.into(),
            to_port: to_port.into(),
            data_type,
        }
    }

    fn targets(&self, node: &str, port: &str) -> bool {
        self.to_node == node && self.to_port == port
    }
}

/// A graph containing nodes and their connections.
///
/// Nodes keep insertion order; evaluation visits output nodes in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    next_node_id: usize,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node under a freshly generated id and returns that id
    pub fn add_node(&mut self, mut node: GraphNode) -> NodeId {
        let id = loop {
            self.next_node_id += 1;
            let candidate = format!("node_{}", self.next_node_id);
            if self.node(&candidate).is_none() {
                break candidate;
            }
        };
        node.id = id.clone();
        self.nodes.push(node);
        id
    }

    /// Adds a node under a caller-chosen id
    pub fn add_node_with_id(&mut self, id: &str, mut node: GraphNode) -> Result<NodeId, GraphError> {
        if self.node(id).is_some() {
            return Err(GraphError::DuplicateNode(id.to_string()));
        }
        node.id = id.to_string();
        self.nodes.push(node);
        Ok(id.to_string())
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Removes a node and all its connections
    pub fn remove_node(&mut self, id: &str) -> Option<GraphNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        self.connections
            .retain(|conn| conn.from_node != id && conn.to_node != id);
        Some(self.nodes.remove(index))
    }

    /// Adds a connection, replacing any existing connection into the same input port.
    ///
    /// Returns the replaced connection. Self-connections and cycles are accepted here; the
    /// evaluator degrades them to empty results.
    pub fn add_connection(&mut self, connection: Connection) -> Result<Option<Connection>, GraphError> {
        for id in [&connection.from_node, &connection.to_node] {
            if self.node(id).is_none() {
                return Err(GraphError::NodeNotFound(id.clone()));
            }
        }
        let replaced = self.remove_connection(&connection.to_node, &connection.to_port);
        self.connections.push(connection);
        Ok(replaced)
    }

    /// Removes the connection feeding `to_port` on `to_node`
    pub fn remove_connection(&mut self, to_node: &str, to_port: &str) -> Option<Connection> {
        let index = self
            .connections
            .iter()
            .position(|c| c.targets(to_node, to_port))?;
        Some(self.connections.remove(index))
    }

    /// The unique connection feeding `to_port` on `to_node`
    pub fn inbound(&self, to_node: &str, to_port: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.targets(to_node, to_port))
    }

    pub fn set_parameter(&mut self, id: &str, name: &str, value: impl Into<ParamValue>) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        node.params.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Reroutes parameter `name` to its `param:<name>` port
    pub fn promote_parameter(&mut self, id: &str, name: &str) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        node.promoted.insert(name.to_string());
        Ok(())
    }

    /// Returns parameter `name` to its literal value, dropping the feeding connection
    pub fn demote_parameter(&mut self, id: &str, name: &str) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        node.promoted.remove(name);
        self.remove_connection(id, &param_port(name));
        Ok(())
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

    fn two_numbers() -> NodeGraph {
        let mut graph = NodeGraph::new();
        graph.add_node_with_id("a", GraphNode::new("number")).unwrap();
        graph.add_node_with_id("b", GraphNode::new("number")).unwrap();
        graph.add_node_with_id("m", GraphNode::new("math")).unwrap();
        graph
    }

    #[test]
    fn test_generated_ids_skip_taken_ones() {
        let mut graph = NodeGraph::new();
        graph.add_node_with_id("node_1", GraphNode::new("number")).unwrap();
        let id = graph.add_node(GraphNode::new("number"));
        assert_eq!(id, "node_2");
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut graph = two_numbers();
        let err = graph.add_node_with_id("a", GraphNode::new("number")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("a".into()));
    }

    #[test]
    fn test_second_connection_replaces_first() {
        let mut graph = two_numbers();
        let first = Connection::new("a", "value", "m", "param:a", DataType::Number);
        assert_eq!(graph.add_connection(first.clone()).unwrap(), None);

        let second = Connection::new("b", "value", "m", "param:a", DataType::Number);
        assert_eq!(graph.add_connection(second.clone()).unwrap(), Some(first));
        assert_eq!(graph.connections, vec![second]);
    }

    #[test]
    fn test_connection_to_missing_node_rejected() {
        let mut graph = two_numbers();
        let result = graph.add_connection(Connection::new("a", "value", "zz", "param:a", DataType::Number));
        assert_eq!(result, Err(GraphError::NodeNotFound("zz".into())));
    }

    #[test]
    fn test_self_connection_allowed() {
        let mut graph = two_numbers();
        let looped = Connection::new("m", "result", "m", "param:a", DataType::Number);
        assert!(graph.add_connection(looped).is_ok());
    }

    #[test]
    fn test_remove_node_drops_connections() {
        let mut graph = two_numbers();
        graph
            .add_connection(Connection::new("a", "value", "m", "param:a", DataType::Number))
            .unwrap();
        graph
            .add_connection(Connection::new("b", "value", "m", "param:b", DataType::Number))
            .unwrap();
        assert!(graph.remove_node("a").is_some());
        assert_eq!(graph.connections.len(), 1);
        assert!(graph.inbound("m", "param:a").is_none());
    }

    #[test]
    fn test_demote_drops_param_connection() {
        let mut graph = two_numbers();
        graph.promote_parameter("m", "a").unwrap();
        graph
            .add_connection(Connection::new("a", "value", "m", "param:a", DataType::Number))
            .unwrap();
        graph.demote_parameter("m", "a").unwrap();
        assert!(!graph.node("m").unwrap().is_promoted("a"));
        assert!(graph.connections.is_empty());
    }
}
