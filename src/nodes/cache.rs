//! Generation-keyed memoization of node execution results
//!
//! Results live for one execution generation. When the generation moves on, or the seed or
//! canvas of a pass differs from the one the entries were computed under, the whole cache is
//! dropped at once.

use std::collections::HashMap;
use std::sync::Arc;

use crate::geometry::CanvasSettings;
use crate::nodes::interface::{NodeOutputs, Parameters};
use crate::nodes::NodeId;

/// Everything one node execution produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeResult {
    pub outputs: NodeOutputs,
    /// The resolved parameters the node executed with
    pub parameters: Parameters,
}

impl NodeResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Statistics about cache performance and usage
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStatistics {
    pub total_entries: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Number of wholesale clears
    pub cache_invalidations: usize,
}

impl CacheStatistics {
    pub fn hit_ratio(&self) -> f64 {
        let total_accesses = self.cache_hits + self.cache_misses;
        if total_accesses == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total_accesses as f64
        }
    }
}

/// Per-node result cache for one execution generation
#[derive(Debug, Default)]
pub struct ExecutionCache {
    entries: HashMap<NodeId, Arc<NodeResult>>,
    generation: u64,
    inputs: Option<(u32, CanvasSettings)>,
    stats: CacheStatistics,
}

impl ExecutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the cache valid for `generation`, `seed` and `canvas`, clearing it if any differ.
    ///
    /// Returns `true` when entries were dropped.
    pub fn prepare(&mut self, generation: u64, seed: u32, canvas: &CanvasSettings) -> bool {
        let stale = self.generation != generation || self.inputs != Some((seed, *canvas));
        self.generation = generation;
        self.inputs = Some((seed, *canvas));
        if stale && !self.entries.is_empty() {
            self.clear();
            return true;
        }
        false
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Looks up a node's result, counting the hit or miss
    pub fn get(&mut self, node_id: &str) -> Option<Arc<NodeResult>> {
        match self.entries.get(node_id) {
            Some(result) => {
                self.stats.cache_hits += 1;
                Some(Arc::clone(result))
            }
            None => {
                self.stats.cache_misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, node_id: &str, result: Arc<NodeResult>) {
        self.entries.insert(node_id.to_string(), result);
        self.stats.total_entries = self.entries.len();
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.entries.contains_key(node_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.total_entries = 0;
        self.stats.cache_invalidations += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn statistics(&self) -> &CacheStatistics {
        &self.stats
    }
}
