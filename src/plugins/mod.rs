//! Plugin contract for generators and modifiers, plus the reference plugins
//!
//! A plugin declares its schema through [`NodePlugin::definition`] and turns resolved
//! parameters and incoming layers into new layers. Generators ignore their input layers;
//! modifiers transform them. The graph evaluator and the linear module stack both drive
//! plugins through this one trait.

pub mod clip;
pub mod displace;
pub mod svg_import;
pub mod transform;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::PluginError;
use crate::geometry::{CanvasSettings, Layer};
use crate::nodes::factory::NodeDefinition;
use crate::nodes::interface::{NodeData, Parameters};
use crate::rng::SeededRng;

pub use clip::ClipPlugin;
pub use displace::DisplacePlugin;
pub use svg_import::SvgImportPlugin;
pub use transform::TransformPlugin;

/// A registered unit that produces or transforms layers of paths
pub trait NodePlugin: Send + Sync {
    /// Static schema; must return the same definition on every call
    fn definition(&self) -> NodeDefinition;

    fn execute(
        &self,
        params: &Parameters,
        inputs: &[Layer],
        context: &mut ExecutionContext,
    ) -> Result<Vec<Layer>, PluginError>;
}

/// Per-execution bundle handed to a plugin
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub canvas: CanvasSettings,
    /// Global seed of the pass
    pub seed: u32,
    /// Stream seeded from the global seed and the instance id
    pub rng: SeededRng,
    /// Id of the node or module being executed
    pub instance_id: String,
    /// Resolved named inputs, keyed by port name
    pub inputs: BTreeMap<String, NodeData>,
}

impl ExecutionContext {
    pub fn new(canvas: CanvasSettings, seed: u32, instance_id: &str) -> Self {
        Self {
            canvas,
            seed,
            rng: SeededRng::for_instance(seed, instance_id),
            instance_id: instance_id.to_string(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: BTreeMap<String, NodeData>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn input(&self, name: &str) -> Option<&NodeData> {
        self.inputs.get(name)
    }

    pub fn input_layers(&self, name: &str) -> Option<&[Layer]> {
        self.inputs.get(name).and_then(NodeData::as_layers)
    }
}

/// The reference plugins shipped with the crate
pub fn builtin_plugins() -> Vec<Arc<dyn NodePlugin>> {
    vec![
        Arc::new(SvgImportPlugin),
        Arc::new(TransformPlugin),
        Arc::new(ClipPlugin),
        Arc::new(DisplacePlugin),
    ]
}

/// Applies `f` to every path of every layer, keeping layer ids
pub(crate) fn map_paths<F>(inputs: &[Layer], mut f: F) -> Vec<Layer>
where
    F: FnMut(&crate::geometry::Path) -> Vec<crate::geometry::Path>,
{
    inputs
        .iter()
        .map(|layer| Layer::new(layer.id.clone(), layer.paths.iter().flat_map(&mut f).collect()))
        .collect()
}
