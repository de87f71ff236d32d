//! Node graph execution engine
//!
//! Evaluation is a recursive, memoized, post-order walk that starts at every output node:
//! - results are cached per node for one execution generation
//! - nodes on the active call path are tracked so cycles degrade to empty results
//! - primary inputs and promoted `param:<name>` ports are resolved through their unique
//!   inbound connection
//! - a node that fails or has an unknown type produces nothing and leaves a [`Diagnostic`]
//!
//! Evaluation never blocks. External data sources answer from their cache and report
//! finished fetches through [`GraphEngine::poll_external_data`].

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::constants::evaluation::MAX_EVALUATION_DEPTH;
use crate::error::PluginError;
use crate::geometry::{CanvasSettings, Layer, OutputLayer};
use crate::nodes::cache::{CacheStatistics, ExecutionCache, NodeResult};
use crate::nodes::coercion::{coerce, Coerced};
use crate::nodes::data::{self, ExternalDataCache};
use crate::nodes::factory::NodeDefinition;
use crate::nodes::graph::{Connection, NodeGraph};
use crate::nodes::interface::{NodeData, NodeOutputs, Parameters};
use crate::nodes::node::{param_port, GraphNode};
use crate::nodes::registry::{NodeKind, NodeRegistry, RegisteredNode};
use crate::nodes::{math, output, utility};
use crate::plugins::ExecutionContext;

/// What went wrong at a node during evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The node was reached again while already being evaluated
    Cycle,
    UnknownNodeType,
    /// The node's execution returned an error
    ExecutionFailed,
    /// The dependency chain was deeper than the engine allows
    DepthLimit,
    /// A connection names a node that is not in the graph
    MissingNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub node_id: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Counters for the most recent evaluation pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExecutionStats {
    pub nodes_executed: usize,
    pub cache_hits: usize,
    pub output_layers: usize,
}

/// Evaluates node graphs into pen layers
pub struct GraphEngine {
    registry: NodeRegistry,
    cache: ExecutionCache,
    external: ExternalDataCache,
    generation: u64,
    max_depth: usize,
    diagnostics: Vec<Diagnostic>,
    stats: ExecutionStats,
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new(NodeRegistry::with_builtins())
    }
}

impl GraphEngine {
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            registry,
            cache: ExecutionCache::new(),
            external: ExternalDataCache::default(),
            generation: 0,
            max_depth: MAX_EVALUATION_DEPTH,
            diagnostics: Vec::new(),
            stats: ExecutionStats::default(),
        }
    }

    /// Caps the dependency chain length followed from any output
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_external_cache(mut self, external: ExternalDataCache) -> Self {
        self.external = external;
        self
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Mutable registry access; starts a new generation since node behaviour may change
    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        self.bump_generation();
        &mut self.registry
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidates every cached result; call after any structural or parameter edit
    pub fn bump_generation(&mut self) {
        self.generation += 1;
        debug!("execution generation {}", self.generation);
    }

    /// Applies finished external fetches, bumping the generation when new values arrived
    pub fn poll_external_data(&mut self) -> bool {
        let updated = self.external.poll();
        if updated {
            self.bump_generation();
        }
        updated
    }

    /// Blocks until running external fetches finish or `timeout` elapses
    pub fn wait_for_external_data(&mut self, timeout: Duration) -> bool {
        let updated = self.external.wait(timeout);
        if updated {
            self.bump_generation();
        }
        updated
    }

    pub fn external_data(&self) -> &ExternalDataCache {
        &self.external
    }

    /// Diagnostics recorded since the cache was last invalidated
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    pub fn cache_statistics(&self) -> &CacheStatistics {
        self.cache.statistics()
    }

    /// One pen layer per enabled output node, sorted by pen number.
    ///
    /// Output nodes with the same pen keep their order in the graph.
    pub fn evaluate(&mut self, graph: &NodeGraph, canvas: &CanvasSettings, seed: u32) -> Vec<OutputLayer> {
        self.begin_pass(canvas, seed);
        let layers = self.evaluation(graph, canvas, seed).collect_outputs();
        self.stats.output_layers = layers.len();
        debug!(
            "evaluated {} outputs: {} nodes executed, {} cache hits",
            layers.len(),
            self.stats.nodes_executed,
            self.stats.cache_hits
        );
        layers
    }

    /// Value of one named output of one node
    pub fn evaluate_port(
        &mut self,
        graph: &NodeGraph,
        canvas: &CanvasSettings,
        seed: u32,
        node_id: &str,
        port: &str,
    ) -> Option<NodeData> {
        self.begin_pass(canvas, seed);
        let result = self.evaluation(graph, canvas, seed).evaluate_node(node_id);
        result.outputs.select(port).cloned()
    }

    fn begin_pass(&mut self, canvas: &CanvasSettings, seed: u32) {
        let invalidated = self.cache.prepare(self.generation, seed, canvas);
        if invalidated || self.cache.is_empty() {
            self.diagnostics.clear();
        }
        self.stats = ExecutionStats::default();
    }

    fn evaluation<'a>(&'a mut self, graph: &'a NodeGraph, canvas: &CanvasSettings, seed: u32) -> Evaluation<'a> {
        Evaluation {
            graph,
            registry: &self.registry,
            cache: &mut self.cache,
            external: &mut self.external,
            diagnostics: &mut self.diagnostics,
            stats: &mut self.stats,
            canvas: *canvas,
            seed,
            max_depth: self.max_depth,
            active: HashSet::new(),
        }
    }
}

/// State of one evaluation pass
struct Evaluation<'a> {
    graph: &'a NodeGraph,
    registry: &'a NodeRegistry,
    cache: &'a mut ExecutionCache,
    external: &'a mut ExternalDataCache,
    diagnostics: &'a mut Vec<Diagnostic>,
    stats: &'a mut ExecutionStats,
    canvas: CanvasSettings,
    seed: u32,
    max_depth: usize,
    /// Nodes on the current call path
    active: HashSet<&'a str>,
}

impl<'a> Evaluation<'a> {
    fn collect_outputs(&mut self) -> Vec<OutputLayer> {
        let graph = self.graph;
        let registry = self.registry;
        let mut layers = Vec::new();
        for node in &graph.nodes {
            let Some(registered) = registry.get(&node.node_type) else {
                continue;
            };
            if !matches!(registered.kind, NodeKind::Output) {
                continue;
            }
            let literal = registered.definition.resolve_parameters(&node.params);
            if !node.is_promoted("enabled") && !literal.boolean("enabled") {
                debug!("skipping disabled output {}", node.id);
                continue;
            }
            let result = self.evaluate_node(&node.id);
            let layer = output::output_layer(&node.id, &result);
            if layer.enabled {
                layers.push(layer);
            }
        }
        layers.sort_by_key(|layer| layer.pen);
        layers
    }

    fn evaluate_node(&mut self, node_id: &str) -> Arc<NodeResult> {
        let graph = self.graph;
        let Some(node) = graph.node(node_id) else {
            self.report(
                node_id,
                DiagnosticKind::MissingNode,
                format!("node {} is referenced but not in the graph", node_id),
            );
            return Arc::new(NodeResult::empty());
        };
        let id = node.id.as_str();

        if self.active.contains(id) {
            self.report(id, DiagnosticKind::Cycle, format!("cycle detected at node {}", id));
            return Arc::new(NodeResult::empty());
        }
        if let Some(result) = self.cache.get(id) {
            self.stats.cache_hits += 1;
            return result;
        }
        if self.active.len() >= self.max_depth {
            self.report(
                id,
                DiagnosticKind::DepthLimit,
                format!("node {} is more than {} levels deep", id, self.max_depth),
            );
            return Arc::new(NodeResult::empty());
        }

        self.active.insert(id);
        let result = Arc::new(self.execute(node));
        self.active.remove(id);
        self.cache.insert(id, Arc::clone(&result));
        result
    }

    fn execute(&mut self, node: &'a GraphNode) -> NodeResult {
        let registry = self.registry;
        let Some(registered) = registry.get(&node.node_type) else {
            self.report(
                &node.id,
                DiagnosticKind::UnknownNodeType,
                format!("node {} has unknown type '{}'", node.id, node.node_type),
            );
            return NodeResult::empty();
        };

        let definition = &registered.definition;
        let mut parameters = definition.resolve_parameters(&node.params);
        self.apply_promotions(node, definition, &mut parameters);
        let inputs = self.resolve_inputs(node, definition);

        self.stats.nodes_executed += 1;
        let outputs = match self.dispatch(node, registered, &parameters, inputs) {
            Ok(outputs) => outputs,
            Err(err) => {
                self.report(
                    &node.id,
                    DiagnosticKind::ExecutionFailed,
                    format!("node {} ({}) failed: {}", node.id, node.node_type, err),
                );
                NodeOutputs::new()
            }
        };
        NodeResult { outputs, parameters }
    }

    /// Replaces promoted parameters with the coerced value of their connection
    fn apply_promotions(&mut self, node: &GraphNode, definition: &NodeDefinition, parameters: &mut Parameters) {
        let graph = self.graph;
        for name in &node.promoted {
            let Some(connection) = graph.inbound(&node.id, &param_port(name)) else {
                continue;
            };
            let declared = match definition.parameter(name) {
                Some(parameter) => parameter.promotable,
                None => Some(connection.data_type),
            };
            let Some(declared) = declared else {
                debug!("parameter {} of {} cannot be promoted", name, node.id);
                continue;
            };
            let Some(incoming) = self.pull(connection) else {
                continue;
            };
            match coerce(declared, &incoming) {
                Some(Coerced::Literal(value)) => parameters.set(name, value),
                Some(Coerced::Signal(data)) => parameters.set_signal(name, data),
                None => debug!(
                    "{} does not fit parameter {} of {}, keeping the literal",
                    incoming.data_type().map_or("nothing", |t| t.name()),
                    name,
                    node.id
                ),
            }
        }
    }

    fn resolve_inputs(&mut self, node: &GraphNode, definition: &NodeDefinition) -> BTreeMap<String, NodeData> {
        let graph = self.graph;
        let mut inputs = BTreeMap::new();
        for port in &definition.inputs {
            if let Some(connection) = graph.inbound(&node.id, &port.name) {
                if let Some(data) = self.pull(connection) {
                    inputs.insert(port.name.clone(), data);
                }
            }
        }
        inputs
    }

    /// Evaluates the source of `connection` and extracts the named output
    fn pull(&mut self, connection: &Connection) -> Option<NodeData> {
        let result = self.evaluate_node(&connection.from_node);
        result.outputs.select(&connection.from_port).cloned()
    }

    fn dispatch(
        &mut self,
        node: &GraphNode,
        registered: &RegisteredNode,
        parameters: &Parameters,
        inputs: BTreeMap<String, NodeData>,
    ) -> Result<NodeOutputs, PluginError> {
        match &registered.kind {
            NodeKind::Number => Ok(data::execute_number(parameters)),
            NodeKind::Vector => Ok(data::execute_vector(parameters)),
            NodeKind::Boolean => Ok(data::execute_boolean(parameters)),
            NodeKind::Math => math::execute_math(parameters),
            NodeKind::Range => Ok(math::execute_range(parameters)),
            NodeKind::Merge => Ok(utility::execute_merge(&inputs)),
            NodeKind::Output => Ok(output::execute_output(&inputs)),
            NodeKind::Plugin(plugin) => {
                let layers: Vec<Layer> = inputs
                    .get("paths")
                    .and_then(NodeData::as_layers)
                    .map(<[_]>::to_vec)
                    .unwrap_or_default();
                let mut context = ExecutionContext::new(self.canvas, self.seed, &node.id).with_inputs(inputs);
                let produced = plugin.execute(parameters, &layers, &mut context)?;
                let port = registered
                    .definition
                    .outputs
                    .first()
                    .map_or("paths", |p| p.name.as_str());
                Ok(NodeOutputs::single(port, NodeData::Paths(produced)))
            }
            NodeKind::DataSource(fetcher) => Ok(self.external.resolve(
                &node.id,
                fetcher,
                &registered.definition,
                parameters,
            )),
        }
    }

    fn report(&mut self, node_id: &str, kind: DiagnosticKind, message: String) {
        let diagnostic = Diagnostic {
            node_id: node_id.to_string(),
            kind,
            message,
        };
        if !self.diagnostics.contains(&diagnostic) {
            warn!("{}", diagnostic.message);
            self.diagnostics.push(diagnostic);
        }
    }
}
