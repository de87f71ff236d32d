//! Math operation nodes

pub mod range;

pub use range::{range_definition, remap, execute_range};

use crate::error::PluginError;
use crate::nodes::factory::{DataType, NodeCategory, NodeDefinition, ParameterDefinition, PortDefinition};
use crate::nodes::interface::{NodeData, NodeOutputs, Parameters};

pub const MATH_NODE_TYPE: &str = "math";

/// Binary operation applied by the math node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
    Modulo,
    Power,
}

impl MathOperation {
    pub const ALL: [MathOperation; 8] = [
        MathOperation::Add,
        MathOperation::Subtract,
        MathOperation::Multiply,
        MathOperation::Divide,
        MathOperation::Min,
        MathOperation::Max,
        MathOperation::Modulo,
        MathOperation::Power,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MathOperation::Add => "add",
            MathOperation::Subtract => "subtract",
            MathOperation::Multiply => "multiply",
            MathOperation::Divide => "divide",
            MathOperation::Min => "min",
            MathOperation::Max => "max",
            MathOperation::Modulo => "modulo",
            MathOperation::Power => "power",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Division and modulo by zero yield 0
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            MathOperation::Add => a + b,
            MathOperation::Subtract => a - b,
            MathOperation::Multiply => a * b,
            MathOperation::Divide => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
            MathOperation::Min => a.min(b),
            MathOperation::Max => a.max(b),
            MathOperation::Modulo => {
                if b == 0.0 {
                    0.0
                } else {
                    a % b
                }
            }
            MathOperation::Power => a.powf(b),
        }
    }
}

pub fn math_definition() -> NodeDefinition {
    let names: Vec<&str> = MathOperation::ALL.iter().map(MathOperation::name).collect();
    NodeDefinition::new(MATH_NODE_TYPE, "Math", NodeCategory::math(), "Binary arithmetic on two numbers")
        .with_outputs(vec![PortDefinition::required("result", DataType::Number)])
        .with_parameters(vec![
            ParameterDefinition::select("operation", "Operation", &names, "add"),
            ParameterDefinition::number("a", "A", 0.0),
            ParameterDefinition::number("b", "B", 0.0),
        ])
}

pub fn execute_math(params: &Parameters) -> Result<NodeOutputs, PluginError> {
    let name = params.text("operation");
    let operation = MathOperation::from_name(name).ok_or_else(|| PluginError::InvalidParameter {
        name: "operation".to_string(),
        reason: format!("unknown operation '{}'", name),
    })?;
    let result = operation.apply(params.number("a"), params.number("b"));
    Ok(NodeOutputs::single("result", NodeData::Number(result)))
}
