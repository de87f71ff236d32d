//! Linear module stack: the graph-free way of chaining plugins
//!
//! Modules run bottom to top. A generator adds its layers to what has accumulated so far;
//! a modifier replaces the accumulated layers with its output. Every module draws from its
//! own RNG stream seeded by the global seed and its instance id, so reordering modules
//! leaves the randomness of the others untouched.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GraphError;
use crate::geometry::{CanvasSettings, Layer, OutputLayer};
use crate::nodes::execution_engine::{Diagnostic, DiagnosticKind};
use crate::nodes::interface::ParamValue;
use crate::nodes::registry::{NodeKind, NodeRegistry};
use crate::plugins::ExecutionContext;

/// One plugin instance in the stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

fn default_enabled() -> bool {
    true
}

impl ModuleInstance {
    /// New instance with a random id
    pub fn new(module_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            module_type: module_type.into(),
            enabled: true,
            params: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

/// Result of running the stack once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackOutput {
    pub layers: Vec<Layer>,
    pub diagnostics: Vec<Diagnostic>,
}

impl StackOutput {
    /// All paths as one pen layer
    pub fn into_output_layer(self, id: &str, pen: u32) -> OutputLayer {
        let paths = self.layers.into_iter().flat_map(|layer| layer.paths).collect();
        OutputLayer::new(id, pen).with_paths(paths)
    }
}

/// Ordered modules; index 0 is the bottom of the stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleStack {
    modules: Vec<ModuleInstance>,
}

impl ModuleStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module on top and returns its id
    pub fn push(&mut self, module: ModuleInstance) -> String {
        let id = module.id.clone();
        self.modules.push(module);
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<ModuleInstance> {
        let index = self.index_of(id)?;
        Some(self.modules.remove(index))
    }

    /// Moves a module to `index`, clamped to the top of the stack
    pub fn move_to(&mut self, id: &str, index: usize) -> Result<(), GraphError> {
        let from = self
            .index_of(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let module = self.modules.remove(from);
        let to = index.min(self.modules.len());
        self.modules.insert(to, module);
        Ok(())
    }

    pub fn set_parameter(&mut self, id: &str, name: &str, value: impl Into<ParamValue>) -> Result<(), GraphError> {
        let module = self
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        module.params.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), GraphError> {
        let module = self
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        module.enabled = enabled;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ModuleInstance> {
        self.modules.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ModuleInstance> {
        self.modules.iter_mut().find(|m| m.id == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == id)
    }

    pub fn modules(&self) -> &[ModuleInstance] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Runs every enabled module bottom to top.
    ///
    /// Module types that are unknown or not plugins are skipped. A module that fails
    /// produces nothing, so a failing modifier leaves no layers behind.
    pub fn evaluate(&self, registry: &NodeRegistry, canvas: &CanvasSettings, seed: u32) -> StackOutput {
        let mut output = StackOutput::default();
        for module in self.modules.iter().filter(|m| m.enabled) {
            let plugin = match registry.get(&module.module_type) {
                Some(registered) => match &registered.kind {
                    NodeKind::Plugin(plugin) => Some((registered, plugin)),
                    _ => None,
                },
                None => None,
            };
            let Some((registered, plugin)) = plugin else {
                report(
                    &mut output.diagnostics,
                    &module.id,
                    DiagnosticKind::UnknownNodeType,
                    format!("module {} has no plugin of type '{}'", module.id, module.module_type),
                );
                continue;
            };

            let definition = &registered.definition;
            let params = definition.resolve_parameters(&module.params);
            let is_modifier = definition.input("paths").is_some();
            let mut context = ExecutionContext::new(*canvas, seed, &module.id);

            let produced = match plugin.execute(&params, &output.layers, &mut context) {
                Ok(layers) => layers,
                Err(err) => {
                    report(
                        &mut output.diagnostics,
                        &module.id,
                        DiagnosticKind::ExecutionFailed,
                        format!("module {} ({}) failed: {}", module.id, module.module_type, err),
                    );
                    Vec::new()
                }
            };
            debug!(
                "module {} ({}) produced {} layers",
                module.id,
                module.module_type,
                produced.len()
            );
            if is_modifier {
                output.layers = produced;
            } else {
                output.layers.extend(produced);
            }
        }
        output
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, node_id: &str, kind: DiagnosticKind, message: String) {
    warn!("{}", message);
    diagnostics.push(Diagnostic {
        node_id: node_id.to_string(),
        kind,
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::geometry::{Path, Point};
    use crate::nodes::factory::{NodeDefinition, ParameterDefinition};
    use crate::nodes::interface::Parameters;
    use crate::plugins::NodePlugin;
    use std::sync::Arc;

    /// Generator scattering short random strokes
    struct Scatter;

    impl NodePlugin for Scatter {
        fn definition(&self) -> NodeDefinition {
            NodeDefinition::generator("scatter", "Scatter", "Random strokes")
                .with_parameters(vec![ParameterDefinition::number("count", "Count", 3.0)])
        }

        fn execute(
            &self,
            params: &Parameters,
            _inputs: &[Layer],
            context: &mut ExecutionContext,
        ) -> Result<Vec<Layer>, PluginError> {
            let (w, h) = (context.canvas.width, context.canvas.height);
            let paths = (0..params.number("count") as usize)
                .map(|_| {
                    let a = Point::new(context.rng.range(0.0, w), context.rng.range(0.0, h));
                    Path::new(vec![a, a + Point::new(1.0, 0.0)])
                })
                .collect();
            Ok(vec![Layer::new(context.instance_id.clone(), paths)])
        }
    }

    fn registry() -> NodeRegistry {
        let mut registry = NodeRegistry::with_builtins();
        registry.register_plugin(Arc::new(Scatter)).unwrap();
        registry
    }

    #[test]
    fn test_generators_accumulate_and_modifiers_replace() {
        let mut stack = ModuleStack::new();
        stack.push(ModuleInstance::new("scatter").with_id("a"));
        stack.push(ModuleInstance::new("scatter").with_id("b").with_param("count", 2.0));
        stack.push(ModuleInstance::new("transform").with_id("t").with_param("translate_x", 5.0));
        let canvas = CanvasSettings::default();

        let output = stack.evaluate(&registry(), &canvas, 7);
        assert_eq!(output.layers.len(), 2);
        assert_eq!(output.layers[0].paths.len(), 3);
        assert_eq!(output.layers[1].paths.len(), 2);
        assert!(output.diagnostics.is_empty());

        stack.set_enabled("t", false).unwrap();
        let untransformed = stack.evaluate(&registry(), &canvas, 7);
        let moved = output.layers[0].paths[0].points[0];
        let original = untransformed.layers[0].paths[0].points[0];
        assert!((moved.x - original.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_reordering_keeps_each_module_stream() {
        let mut stack = ModuleStack::new();
        stack.push(ModuleInstance::new("scatter").with_id("a"));
        stack.push(ModuleInstance::new("scatter").with_id("b"));
        let canvas = CanvasSettings::default();
        let before = stack.evaluate(&registry(), &canvas, 3);

        stack.move_to("b", 0).unwrap();
        let after = stack.evaluate(&registry(), &canvas, 3);
        assert_eq!(before.layers[0], after.layers[1]);
        assert_eq!(before.layers[1], after.layers[0]);
    }

    #[test]
    fn test_failing_modifier_clears_layers() {
        let mut stack = ModuleStack::new();
        stack.push(ModuleInstance::new("scatter").with_id("a"));
        stack.push(ModuleInstance::new("clip").with_id("c").with_param("shape", "hexagon"));
        stack.push(ModuleInstance::new("nope").with_id("x"));

        let output = stack.evaluate(&registry(), &CanvasSettings::default(), 0);
        assert!(output.layers.is_empty());
        let kinds: Vec<DiagnosticKind> = output.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::ExecutionFailed, DiagnosticKind::UnknownNodeType]);
    }

    #[test]
    fn test_edits_and_serialization() {
        let mut stack = ModuleStack::new();
        let id = stack.push(ModuleInstance::new("scatter"));
        assert_eq!(Uuid::parse_str(&id).map(|u| u.get_version_num()), Ok(4));
        stack.set_parameter(&id, "count", 9.0).unwrap();
        assert!(stack.set_parameter("missing", "count", 1.0).is_err());

        let json = serde_json::to_string(&stack).unwrap();
        let restored: ModuleStack = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, stack);
        assert!(stack.remove(&id).is_some());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_into_output_layer() {
        let output = StackOutput {
            layers: vec![
                Layer::new("a", vec![Path::from_coords(&[(0.0, 0.0), (1.0, 0.0)])]),
                Layer::new("b", vec![Path::from_coords(&[(2.0, 0.0), (3.0, 0.0)])]),
            ],
            diagnostics: Vec::new(),
        };
        let layer = output.into_output_layer("stack", 2);
        assert_eq!(layer.pen, 2);
        assert_eq!(layer.paths.len(), 2);
    }
}
