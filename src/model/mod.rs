//! # Edge Model
//!
//! Plain DTOs shared by every stage: edges, scalar edge codes, edge sets
//! with optional labels and weights, node embeddings, and the persisted
//! event graph.
//!
//! Design rule: no sparse matrices, no RNG, no storage here.
//! This module is pure data: no I/O, no async.

pub mod edge;
pub mod edge_set;
pub mod embedding;
pub mod event;

pub use edge::{Edge, PairCode};
pub use edge_set::{EdgeSet, LabeledEdgeSet, TrainingSet};
pub use embedding::Embeddings;
pub use event::EventGraph;
