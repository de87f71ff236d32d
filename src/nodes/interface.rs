//! Values that flow between nodes and the resolved parameter record handed to node execution

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Layer, Point};
use crate::nodes::factory::DataType;

/// Core data types that flow between nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    /// Layers of polylines
    Paths(Vec<Layer>),
    Number(f64),
    Vector(Point),
    Boolean(bool),
    NumberArray(Vec<f64>),
    /// Empty/null value
    None,
}

impl NodeData {
    /// The wire type this value travels as, `None` for the empty value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            NodeData::Paths(_) => Some(DataType::Paths),
            NodeData::Number(_) => Some(DataType::Number),
            NodeData::Vector(_) => Some(DataType::Vector),
            NodeData::Boolean(_) => Some(DataType::Boolean),
            NodeData::NumberArray(_) => Some(DataType::NumberArray),
            NodeData::None => None,
        }
    }

    pub fn as_layers(&self) -> Option<&[Layer]> {
        match self {
            NodeData::Paths(layers) => Some(layers),
            _ => None,
        }
    }

    pub fn into_layers(self) -> Vec<Layer> {
        match self {
            NodeData::Paths(layers) => layers,
            _ => Vec::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            NodeData::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A literal parameter value as stored in a project file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            ParamValue::Number(n) => Some(*n != 0.0),
            ParamValue::Text(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Fully populated parameter record for one node execution.
///
/// Built by merging a definition's defaults with the node's stored overrides, then applying
/// any promoted connections. Literal values live in `values`; connected signals that have no
/// literal form (paths, vectors, number arrays) live in `signals`. Accessors never fail: a name
/// that resolves to nothing reads as zero, false or the empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, ParamValue>,
    signals: BTreeMap<String, NodeData>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn set_signal(&mut self, name: &str, data: NodeData) {
        self.signals.insert(name.to_string(), data);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn signal(&self, name: &str) -> Option<&NodeData> {
        self.signals.get(name)
    }

    pub fn number(&self, name: &str) -> f64 {
        self.values.get(name).and_then(ParamValue::as_number).unwrap_or(0.0)
    }

    pub fn boolean(&self, name: &str) -> bool {
        self.values.get(name).and_then(ParamValue::as_bool).unwrap_or(false)
    }

    pub fn text(&self, name: &str) -> &str {
        self.values.get(name).and_then(ParamValue::as_text).unwrap_or("")
    }

    /// Connected vector signal, if one arrived on this parameter's port
    pub fn vector(&self, name: &str) -> Option<Point> {
        match self.signals.get(name) {
            Some(NodeData::Vector(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn layers(&self, name: &str) -> Option<&[Layer]> {
        self.signals.get(name).and_then(NodeData::as_layers)
    }

    pub fn number_array(&self, name: &str) -> Option<&[f64]> {
        match self.signals.get(name) {
            Some(NodeData::NumberArray(values)) => Some(values),
            _ => None,
        }
    }

    pub fn values(&self) -> &BTreeMap<String, ParamValue> {
        &self.values
    }

    /// Stable text form of the literal values, used as a cache key
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(&self.values).unwrap_or_default()
    }
}

/// Named outputs produced by one node execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutputs {
    values: BTreeMap<String, NodeData>,
}

impl NodeOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(port: &str, data: NodeData) -> Self {
        let mut outputs = Self::new();
        outputs.insert(port, data);
        outputs
    }

    pub fn insert(&mut self, port: &str, data: NodeData) {
        self.values.insert(port.to_string(), data);
    }

    pub fn get(&self, port: &str) -> Option<&NodeData> {
        self.values.get(port)
    }

    /// Looks up `port`, falling back to the only output when the node has exactly one
    pub fn select(&self, port: &str) -> Option<&NodeData> {
        self.values.get(port).or_else(|| {
            if self.values.len() == 1 {
                self.values.values().next()
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeData)> {
        self.values.iter()
    }
}
