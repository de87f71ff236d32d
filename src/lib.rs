//! Penflow core library
//!
//! Evaluates graphs of generator and modifier nodes into pen layers, optimizes them for
//! plotting and moves geometry in and out of SVG.

pub mod constants;
pub mod error;
pub mod geometry;
pub mod nodes;
pub mod optimize;
pub mod plugins;
pub mod project;
pub mod rng;
pub mod settings;
pub mod stack;
pub mod svg;

// Re-export commonly used types
pub use error::{FetchError, GraphError, PluginError, ProjectError};
pub use geometry::{CanvasSettings, Layer, OutputLayer, Path, Point};
pub use nodes::{GraphEngine, NodeGraph, NodeRegistry};
pub use optimize::{run_pipeline, OptimizationReport, PlotStats};
pub use plugins::{ExecutionContext, NodePlugin};
pub use project::{load_project, save_project, Project};
pub use rng::SeededRng;
pub use settings::{OptimizationSettings, SvgImportOptions};
pub use stack::{ModuleInstance, ModuleStack};
