//! The persisted per-event graph.

use serde::{Deserialize, Serialize};

use super::{EdgeSet, Embeddings};

/// One detector event as handed between pipeline stages: node features,
/// the candidate graph and its truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventGraph {
    /// Store key, e.g. `"event000001000"`.
    pub event_id: String,
    pub node_features: Embeddings,
    /// Candidate (predicted) edges.
    pub edge_index: EdgeSet,
    /// Per-edge truth for `edge_index`, once known.
    #[serde(default)]
    pub labels: Option<Vec<bool>>,
    /// Module-wise truth graph.
    pub true_edges: EdgeSet,
    /// Bidirectional signal truth used for training.
    pub signal_true_edges: EdgeSet,
    /// Detector module per node, for module-veto purity.
    #[serde(default)]
    pub modules: Option<Vec<u64>>,
}

impl EventGraph {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self { event_id: event_id.into(), ..Self::default() }
    }

    pub fn with_features(mut self, features: Embeddings) -> Self {
        self.node_features = features;
        self
    }

    pub fn with_edges(mut self, edges: EdgeSet) -> Self {
        self.edge_index = edges;
        self
    }

    /// Set the module-wise truth and derive the bidirectional signal truth
    /// from it.
    pub fn with_truth(mut self, truth: EdgeSet) -> Self {
        self.signal_true_edges = truth.bidirectional();
        self.true_edges = truth;
        self
    }

    pub fn with_modules(mut self, modules: Vec<u64>) -> Self {
        self.modules = Some(modules);
        self
    }

    pub fn num_nodes(&self) -> usize {
        self.node_features.len()
    }
}
