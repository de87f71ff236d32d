//! Conversion of values arriving on promoted parameter ports

use crate::nodes::factory::DataType;
use crate::nodes::interface::{NodeData, ParamValue};

/// What a promoted connection contributes to a node's parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Replaces the parameter's literal value
    Literal(ParamValue),
    /// Attached as a signal next to the literal value
    Signal(NodeData),
}

/// Applies the fixed coercion table for a parameter declared as `declared`.
///
/// `None` means the arriving value does not fit and the parameter keeps its literal value.
pub fn coerce(declared: DataType, incoming: &NodeData) -> Option<Coerced> {
    match (declared, incoming) {
        (DataType::Number, NodeData::Number(n)) => Some(Coerced::Literal(ParamValue::Number(*n))),
        (DataType::Number, NodeData::Vector(v)) => Some(Coerced::Literal(ParamValue::Number(v.x))),
        (DataType::Number, NodeData::Boolean(b)) => {
            Some(Coerced::Literal(ParamValue::Number(if *b { 1.0 } else { 0.0 })))
        }
        (DataType::Boolean, NodeData::Boolean(b)) => Some(Coerced::Literal(ParamValue::Boolean(*b))),
        (DataType::Boolean, NodeData::Number(n)) => Some(Coerced::Literal(ParamValue::Boolean(*n != 0.0))),
        (DataType::Vector, NodeData::Vector(_))
        | (DataType::Paths, NodeData::Paths(_))
        | (DataType::NumberArray, NodeData::NumberArray(_)) => Some(Coerced::Signal(incoming.clone())),
        _ => None,
    }
}
