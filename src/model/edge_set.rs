//! Edge collections, optionally labeled and weighted.

use serde::{Deserialize, Serialize};

use super::Edge;
use crate::{Error, Result};

/// An ordered collection of edges.
///
/// Operations never mutate an edge set handed to them; every stage
/// builds a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeSet {
    edges: Vec<Edge>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { edges: Vec::with_capacity(capacity) }
    }

    pub fn from_edges(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self { edges: pairs.into_iter().map(Edge::from).collect() }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_vec(self) -> Vec<Edge> {
        self.edges
    }

    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Append every edge of `other`, keeping duplicates.
    pub fn extend_from(&mut self, other: &EdgeSet) {
        self.edges.extend_from_slice(&other.edges);
    }

    /// Largest node id referenced, or `None` for an empty set.
    pub fn max_node(&self) -> Option<u32> {
        self.edges.iter().map(|e| e.max_node()).max()
    }

    /// Smallest id space `[0, N)` that contains every endpoint.
    pub fn id_space(&self) -> usize {
        self.max_node().map_or(0, |m| m as usize + 1)
    }

    /// Fail with `NodeOutOfBounds` if any endpoint is `>= bound`.
    pub fn check_bounds(&self, bound: usize) -> Result<()> {
        match self.edges.iter().find(|e| e.max_node() as usize >= bound) {
            Some(e) => Err(Error::NodeOutOfBounds {
                node: e.max_node() as u64,
                bound: bound as u64,
            }),
            None => Ok(()),
        }
    }

    /// Every edge flipped, same order.
    pub fn reversed(&self) -> Self {
        Self { edges: self.edges.iter().map(|e| e.reversed()).collect() }
    }

    /// The set followed by its reversal: the undirected reading of a
    /// truth graph, where both orientations count as a match.
    pub fn bidirectional(&self) -> Self {
        let mut edges = Vec::with_capacity(self.edges.len() * 2);
        edges.extend_from_slice(&self.edges);
        edges.extend(self.edges.iter().map(|e| e.reversed()));
        Self { edges }
    }

    /// Sorted, distinct node ids touched by any edge.
    pub fn unique_nodes(&self) -> Vec<u32> {
        let mut nodes: Vec<u32> = self.edges.iter().flat_map(|e| [e.src, e.dst]).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self { edges: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Edge set plus a boolean correctness label per edge.
///
/// `labels[i]` refers to `edges[i]`; the lengths always agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledEdgeSet {
    edges: EdgeSet,
    labels: Vec<bool>,
}

impl LabeledEdgeSet {
    pub fn new(edges: EdgeSet, labels: Vec<bool>) -> Result<Self> {
        if edges.len() != labels.len() {
            return Err(Error::LengthMismatch {
                what: "edge labels",
                expected: edges.len(),
                got: labels.len(),
            });
        }
        Ok(Self { edges, labels })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of edges labeled true.
    pub fn true_count(&self) -> usize {
        self.labels.iter().filter(|&&y| y).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Edge, bool)> + '_ {
        self.edges.iter().copied().zip(self.labels.iter().copied())
    }

    pub fn into_parts(self) -> (EdgeSet, Vec<bool>) {
        (self.edges, self.labels)
    }
}

/// Labeled edges with a per-edge loss weight, ready for distance
/// computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    edges: EdgeSet,
    labels: Vec<bool>,
    weights: Vec<f32>,
}

impl TrainingSet {
    pub fn new(edges: EdgeSet, labels: Vec<bool>, weights: Vec<f32>) -> Result<Self> {
        if labels.len() != edges.len() {
            return Err(Error::LengthMismatch {
                what: "training labels",
                expected: edges.len(),
                got: labels.len(),
            });
        }
        if weights.len() != edges.len() {
            return Err(Error::LengthMismatch {
                what: "training weights",
                expected: edges.len(),
                got: weights.len(),
            });
        }
        Ok(Self { edges, labels, weights })
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&y| y).count()
    }
}
