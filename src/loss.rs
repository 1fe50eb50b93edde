//! Hinge-embedding contrastive loss.
//!
//! For an edge `(a, b)` the distance is `‖emb_a[a] − emb_b[b]‖²` and the
//! target is `+1` (true) or `−1` (false):
//!
//! | target | per-edge loss |
//! |--------|---------------|
//! | +1 | `d` |
//! | −1 | `max(0, margin − d)` |
//!
//! Each class is averaged on its own and combined as
//! `negative + weight · positive`. An empty class contributes 0.

use crate::config::Config;
use crate::model::embedding::squared_distance;
use crate::model::{EdgeSet, Embeddings};
use crate::{Error, Result};

/// Hinge targets and squared distances, aligned with an edge set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HingeBatch {
    pub targets: Vec<f32>,
    pub distances: Vec<f32>,
}

impl HingeBatch {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Map labels to `±1` targets and measure each edge in embedding space.
pub fn hinge_distance(
    emb_a: &Embeddings,
    emb_b: &Embeddings,
    edges: &EdgeSet,
    labels: &[bool],
) -> Result<HingeBatch> {
    if labels.len() != edges.len() {
        return Err(Error::LengthMismatch {
            what: "hinge labels",
            expected: edges.len(),
            got: labels.len(),
        });
    }
    if emb_a.dim() != emb_b.dim() {
        return Err(Error::DimensionMismatch { expected: emb_a.dim(), got: emb_b.dim() });
    }

    let targets = labels.iter().map(|&y| if y { 1.0 } else { -1.0 }).collect();
    let distances = edges
        .iter()
        .map(|e| Ok(squared_distance(emb_a.node(e.src)?, emb_b.node(e.dst)?)))
        .collect::<Result<Vec<f32>>>()?;

    Ok(HingeBatch { targets, distances })
}

/// Class-balanced hinge loss: `mean_neg + positive_weight · mean_pos`.
pub fn hinge_loss(targets: &[f32], distances: &[f32], margin: f32, positive_weight: f32) -> Result<f32> {
    check_aligned(targets, distances)?;
    let (mut pos_sum, mut pos_n) = (0.0f32, 0usize);
    let (mut neg_sum, mut neg_n) = (0.0f32, 0usize);

    for (&t, &d) in targets.iter().zip(distances) {
        if t > 0.0 {
            pos_sum += d;
            pos_n += 1;
        } else {
            neg_sum += (margin - d).max(0.0);
            neg_n += 1;
        }
    }

    Ok(mean(neg_sum, neg_n) + positive_weight * mean(pos_sum, pos_n))
}

/// Unpartitioned mean hinge loss over every edge.
pub fn hinge_embedding_loss(targets: &[f32], distances: &[f32], margin: f32) -> Result<f32> {
    check_aligned(targets, distances)?;
    let sum: f32 = targets
        .iter()
        .zip(distances)
        .map(|(&t, &d)| if t > 0.0 { d } else { (margin - d).max(0.0) })
        .sum();
    Ok(mean(sum, targets.len()))
}

fn check_aligned(targets: &[f32], distances: &[f32]) -> Result<()> {
    if targets.len() != distances.len() {
        return Err(Error::LengthMismatch {
            what: "hinge distances",
            expected: targets.len(),
            got: distances.len(),
        });
    }
    Ok(())
}

#[inline]
fn mean(sum: f32, n: usize) -> f32 {
    if n == 0 { 0.0 } else { sum / n as f32 }
}

/// Distance and loss in one call.
pub fn compute_loss(
    emb_a: &Embeddings,
    emb_b: &Embeddings,
    edges: &EdgeSet,
    labels: &[bool],
    margin: f32,
    weight: f32,
) -> Result<f32> {
    let hinge = hinge_distance(emb_a, emb_b, edges, labels)?;
    hinge_loss(&hinge.targets, &hinge.distances, margin, weight)
}

/// Margins (already squared) and weights for the two embedding subspaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastiveLoss {
    pub spatial_margin: f32,
    pub topo_margin: f32,
    pub spatial_weight: f32,
    pub topo_weight: f32,
}

impl ContrastiveLoss {
    pub fn from_config(config: &Config) -> Self {
        Self {
            spatial_margin: config.spatial_margin_sq(),
            topo_margin: config.topo_margin_sq(),
            spatial_weight: config.weight,
            topo_weight: config.topo_weight,
        }
    }

    pub fn spatial(&self, hinge: &HingeBatch) -> Result<f32> {
        hinge_loss(&hinge.targets, &hinge.distances, self.spatial_margin, self.spatial_weight)
    }

    pub fn topological(&self, hinge: &HingeBatch) -> Result<f32> {
        hinge_loss(&hinge.targets, &hinge.distances, self.topo_margin, self.topo_weight)
    }

    /// Step loss: the two subspace losses summed.
    pub fn total(&self, spatial: &HingeBatch, topological: &HingeBatch) -> Result<f32> {
        Ok(self.spatial(spatial)? + self.topological(topological)?)
    }
}
