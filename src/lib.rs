//! # trackgraph: Edge-Set Engine for Track-Reconstruction Graphs
//!
//! Combinatorial machinery behind metric-learning of hit graphs:
//! encode edges as scalar codes, reconcile predicted edges against truth,
//! synthesize graphs with controlled purity, and assemble contrastive
//! training pairs.
//!
//! ## Design Principles
//!
//! 1. **Codes, not pairs**: set algebra over millions of edges runs on
//!    `PairCode` scalars, never on pairwise comparisons
//! 2. **Sparse or nothing**: adjacency is CSR, memory scales with edges
//! 3. **Explicit context**: device and RNG travel in a `ComputeContext`
//! 4. **Trait seams**: the embedding model, neighbour search, metric sink
//!    and graph store are collaborators injected by the caller
//!
//! ## Quick Start
//!
//! ```rust
//! use trackgraph::{reconcile, EdgeSet};
//!
//! # fn example() -> trackgraph::Result<()> {
//! let truth = EdgeSet::from_pairs([(0, 1), (1, 2)]).bidirectional();
//! let predicted = EdgeSet::from_pairs([(0, 1), (1, 0), (2, 3)]);
//!
//! let labeled = reconcile(&predicted, &truth)?;
//! assert_eq!(labeled.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! | Component | Module | Description |
//! |-----------|--------|-------------|
//! | PairCodec | `codec` | Cantor pairing with a detected f64 boundary |
//! | Edge-set algebra | `algebra` | union / intersection / difference over codes |
//! | Reconciler | `reconcile` | sparse truth matching with reverse-duplicate collapse |
//! | Synthesizer | `synth` | efficiency-1 graphs at a target purity |
//! | Pair sampler | `sampler` | hard negatives + random pairs + guaranteed positives |
//! | Loss | `loss` | hinge-embedding contrastive loss |
//! | Learner | `learner` | forward / step / evaluate over an injected model |
//! | Stores | `storage` | `GraphStore` trait, memory and directory stores |
//! | Pipeline | `pipeline` | bulk load and the graph-modifier pass |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod codec;
pub mod algebra;
pub mod sparse;
pub mod reconcile;
pub mod synth;
pub mod sampler;
pub mod loss;
pub mod metrics;
pub mod config;
pub mod context;
pub mod learner;
pub mod storage;
pub mod pipeline;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Edge, PairCode, EdgeSet, LabeledEdgeSet, TrainingSet,
    Embeddings, EventGraph,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use reconcile::{reconcile, reconcile_with_bound};
pub use synth::{GraphSynthesizer, SynthesisReport, SynthesisSummary};
pub use sampler::{TrainingPairSampler, NeighborSearch, BruteForceSearch, assemble_training_set};
pub use loss::{ContrastiveLoss, HingeBatch, hinge_distance, hinge_loss, compute_loss};
pub use metrics::{Metric, MetricsSink, MemoryMetricsSink, TracingMetricsSink, efficiency, purity};

// ============================================================================
// Re-exports: Configuration, context, orchestration
// ============================================================================

pub use config::{Config, QuerySelection};
pub use context::{ComputeContext, Device};
pub use learner::{EmbeddingModel, EmbeddingOutputs, MetricLearner, StepLoss, EvaluationReport};
pub use storage::{GraphStore, MemoryGraphStore, StoreConfig, open_store};
pub use pipeline::{GraphModifier, LoadManifest, LoadOutcome, ModifyManifest, load_collection};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Numeric boundary: {0}")]
    NumericBoundary(String),

    #[error("Node {node} out of bounds for id space of size {bound}")]
    NodeOutOfBounds { node: u64, bound: u64 },

    #[error("Length mismatch in {what}: expected {expected}, got {got}")]
    LengthMismatch { what: &'static str, expected: usize, got: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
