//! External data sources and the background-fetch cache that serves them
//!
//! Evaluation never waits on a fetch. A lookup returns whatever value is cached for the
//! node and its parameters, starting at most one background fetch per key when nothing
//! fresh is available. Failed fetches are remembered for one TTL like successful ones,
//! and once a newer fingerprint for the same node lands the expired ones are dropped. Finished fetches arrive over a channel and are applied by
//! [`ExternalDataCache::poll`], which tells the host to start a new execution generation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::constants::data_source::DEFAULT_TTL_SECS;
use crate::error::FetchError;
use crate::nodes::factory::NodeDefinition;
use crate::nodes::interface::{NodeData, NodeOutputs, Parameters};

/// Named numeric values produced by one fetch
pub type SourceValues = BTreeMap<String, f64>;

/// A node whose outputs come from outside the graph (market prices, weather, sensors).
///
/// `fetch` runs on a worker thread and may block.
pub trait DataFetcher: Send + Sync {
    /// Schema of the node; every output port is a number
    fn definition(&self) -> NodeDefinition;

    fn fetch(&self, params: &Parameters) -> Result<SourceValues, FetchError>;
}

#[derive(Debug, Clone)]
struct CachedValues {
    node_id: String,
    /// Last successful result; kept through later failures
    values: Option<SourceValues>,
    checked_at: Instant,
}

struct FetchOutcome {
    node_id: String,
    key: String,
    result: Result<SourceValues, FetchError>,
}

/// Cache of fetched values keyed by node id and parameter fingerprint
pub struct ExternalDataCache {
    entries: HashMap<String, CachedValues>,
    in_flight: HashSet<String>,
    ttl: Duration,
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
}

impl Default for ExternalDataCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl ExternalDataCache {
    pub fn new(ttl: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            entries: HashMap::new(),
            in_flight: HashSet::new(),
            ttl,
            sender,
            receiver,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Best cached values for this node and parameter set.
    ///
    /// Starts a background fetch when the entry is missing or older than the TTL and no
    /// fetch for the same key is already running. Expired values are still returned.
    pub fn lookup(
        &mut self,
        node_id: &str,
        fetcher: &Arc<dyn DataFetcher>,
        params: &Parameters,
    ) -> Option<SourceValues> {
        let key = cache_key(node_id, params);
        let cached = self
            .entries
            .get(&key)
            .map(|entry| (entry.values.clone(), entry.checked_at.elapsed() < self.ttl));

        let fresh = matches!(cached, Some((_, true)));
        if !fresh && !self.in_flight.contains(&key) {
            self.spawn_fetch(node_id, key, Arc::clone(fetcher), params.clone());
        }
        cached.and_then(|(values, _)| values)
    }

    /// One number output per declared port; ports without a value read as 0
    pub fn resolve(
        &mut self,
        node_id: &str,
        fetcher: &Arc<dyn DataFetcher>,
        definition: &NodeDefinition,
        params: &Parameters,
    ) -> NodeOutputs {
        let values = self.lookup(node_id, fetcher, params).unwrap_or_default();
        let mut outputs = NodeOutputs::new();
        for port in &definition.outputs {
            let value = values.get(&port.name).copied().unwrap_or(0.0);
            outputs.insert(&port.name, NodeData::Number(value));
        }
        outputs
    }

    fn spawn_fetch(&mut self, node_id: &str, key: String, fetcher: Arc<dyn DataFetcher>, params: Parameters) {
        let sender = self.sender.clone();
        let worker_node = node_id.to_string();
        let worker_key = key.clone();
        let spawned = thread::Builder::new()
            .name("penflow-fetch".to_string())
            .spawn(move || {
                let result = fetcher.fetch(&params);
                // the cache may already be gone; nothing to report to
                let _ = sender.send(FetchOutcome {
                    node_id: worker_node,
                    key: worker_key,
                    result,
                });
            });
        match spawned {
            Ok(_) => {
                debug!("started fetch for {}", key);
                self.in_flight.insert(key);
            }
            Err(err) => warn!("could not start fetch for {}: {}", key, err),
        }
    }

    /// Applies finished fetches without blocking.
    ///
    /// Returns `true` when at least one new value arrived and the graph should be re-evaluated.
    pub fn poll(&mut self) -> bool {
        let mut updated = false;
        loop {
            match self.receiver.try_recv() {
                Ok(outcome) => updated |= self.apply(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        updated
    }

    /// Blocks until every running fetch has finished or `timeout` elapses.
    ///
    /// Returns `true` when at least one new value arrived.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut updated = false;
        while !self.in_flight.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(outcome) => updated |= self.apply(outcome),
                Err(RecvTimeoutError::Timeout) => {
                    warn!("{} fetches still running after {:?}", self.in_flight.len(), timeout);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        updated
    }

    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let FetchOutcome { node_id, key, result } = outcome;
        self.in_flight.remove(&key);
        let (values, updated) = match result {
            Ok(values) => {
                debug!("fetch for {} returned {} values", key, values.len());
                (Some(values), true)
            }
            Err(err) => {
                warn!("fetch for {} failed: {}", key, err);
                let previous = self.entries.remove(&key).and_then(|entry| entry.values);
                (previous, false)
            }
        };
        self.entries.insert(
            key.clone(),
            CachedValues {
                node_id: node_id.clone(),
                values,
                checked_at: Instant::now(),
            },
        );
        self.evict_superseded(&node_id, &key);
        updated
    }

    /// Drops expired entries of `node_id` other than `current` that have no fetch running
    fn evict_superseded(&mut self, node_id: &str, current: &str) {
        let ttl = self.ttl;
        let in_flight = &self.in_flight;
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            key == current
                || entry.node_id != node_id
                || in_flight.contains(key)
                || entry.checked_at.elapsed() < ttl
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!("evicted {} stale entries for {}", evicted, node_id);
        }
    }

    /// Number of fetches still running
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of cached parameter sets, failed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops cached values; running fetches still land when they finish
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn cache_key(node_id: &str, params: &Parameters) -> String {
    format!("{}|{}", node_id, params.fingerprint())
}
