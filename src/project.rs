//! Project files: canvas, seed, graph and optimizer settings as pretty-printed JSON

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::constants::project::FORMAT_VERSION;
use crate::error::ProjectError;
use crate::geometry::CanvasSettings;
use crate::nodes::NodeGraph;
use crate::settings::OptimizationSettings;
use crate::stack::ModuleStack;

/// Everything needed to reproduce a drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub version: String,
    pub canvas: CanvasSettings,
    pub seed: u32,
    pub graph: NodeGraph,
    /// Used when the graph is empty
    pub stack: ModuleStack,
    pub settings: OptimizationSettings,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            canvas: CanvasSettings::default(),
            seed: 0,
            graph: NodeGraph::new(),
            stack: ModuleStack::new(),
            settings: OptimizationSettings::default(),
        }
    }
}

impl Project {
    /// Rejects versions with a different major number and non-positive canvases
    pub fn validate(&self) -> Result<(), ProjectError> {
        if major(&self.version) != major(FORMAT_VERSION) {
            return Err(ProjectError::UnsupportedVersion(self.version.clone()));
        }
        self.canvas.validate()
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version).trim()
}

pub fn load_project(path: &Path) -> Result<Project, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let project: Project = serde_json::from_str(&content)?;
    project.validate()?;
    info!(
        "loaded project {} ({} nodes, {} modules)",
        path.display(),
        project.graph.len(),
        project.stack.len()
    );
    Ok(project)
}

pub fn save_project(path: &Path, project: &Project) -> Result<(), ProjectError> {
    project.validate()?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("saved project {}", path.display());
    Ok(())
}
