//! Node system - graph model, node definitions and the evaluation engine

// Core node system modules
pub mod cache;
pub mod coercion;
pub mod execution_engine;
pub mod factory;
pub mod graph;
pub mod interface;
pub mod node;
pub mod registry;

// Built-in node implementations
pub mod data;
pub mod math;
pub mod output;
pub mod utility;

// Re-export core types
pub use graph::{Connection, NodeGraph};
pub use node::{param_port, promoted_name, GraphNode, NodeId};

// Re-export factory types
pub use factory::{DataType, NodeCategory, NodeDefinition, ParameterDefinition, ParameterKind, PortDefinition};

pub use interface::{NodeData, NodeOutputs, ParamValue, Parameters};
pub use registry::{NodeKind, NodeRegistry, RegisteredNode};

// Re-export execution engine types
pub use execution_engine::{Diagnostic, DiagnosticKind, ExecutionStats, GraphEngine};
