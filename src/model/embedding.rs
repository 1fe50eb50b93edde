//! Per-node embedding vectors.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Row-major `len × dim` matrix of real-valued node coordinates.
///
/// Row `i` belongs to node id `i`. Produced upstream by the embedding
/// model and read-only to this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embeddings {
    dim: usize,
    data: Vec<f32>,
}

impl Embeddings {
    pub fn new(dim: usize, data: Vec<f32>) -> Result<Self> {
        if dim == 0 {
            if !data.is_empty() {
                return Err(Error::DimensionMismatch { expected: 0, got: data.len() });
            }
            return Ok(Self { dim, data });
        }
        if data.len() % dim != 0 {
            return Err(Error::LengthMismatch {
                what: "embedding buffer",
                expected: (data.len() / dim + 1) * dim,
                got: data.len(),
            });
        }
        Ok(Self { dim, data })
    }

    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, got: row.len() });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { dim, data })
    }

    /// Number of rows (nodes).
    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.dim;
        self.data.get(start..start + self.dim)
    }

    /// Row for node `node`, or `NodeOutOfBounds`.
    pub fn node(&self, node: u32) -> Result<&[f32]> {
        self.row(node as usize).ok_or(Error::NodeOutOfBounds {
            node: node as u64,
            bound: self.len() as u64,
        })
    }

    /// New matrix holding the given rows in order.
    pub fn select(&self, nodes: &[u32]) -> Result<Self> {
        let mut data = Vec::with_capacity(nodes.len() * self.dim);
        for &node in nodes {
            data.extend_from_slice(self.node(node)?);
        }
        Ok(Self { dim: self.dim, data })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Squared Euclidean distance. Slices must have equal length.
#[inline]
pub fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
