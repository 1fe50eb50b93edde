//! # Training Pair Sampler
//!
//! Assembles the labeled edge set one contrastive step trains on:
//!
//! ```text
//! queries ──► hard-negative mining (neighbour search) ──┐
//!        └──► random pairs ─────────────────────────────┤ pool
//!                                                       ▼
//!                                 reconcile(pool, truth) ── labels
//!                                                       ▼
//!                 + truth edges missing from the pool (label true)
//! ```
//!
//! Mined and random pairs are kept whether or not they are correct; the
//! reconciler decides. Nothing is deduplicated across sources: a truth
//! edge whose exact orientation the pool lacks is appended even if the
//! reverse orientation is already there.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::algebra::CodeSet;
use crate::codec;
use crate::config::{Config, QuerySelection};
use crate::context::ComputeContext;
use crate::model::embedding::squared_distance;
use crate::model::{Edge, EdgeSet, Embeddings, EventGraph, TrainingSet};
use crate::reconcile::reconcile;
use crate::{Error, Result};

// ============================================================================
// Neighbour search seam
// ============================================================================

/// Geometric candidate proposal between two embedding sets.
///
/// Returned edges run from `query_ids[i]` (the id of query row `i`) to a
/// row index of `candidates`.
pub trait NeighborSearch {
    fn search(
        &self,
        ctx: &ComputeContext,
        query: &Embeddings,
        query_ids: &[u32],
        candidates: &Embeddings,
        radius: f32,
        k: usize,
    ) -> Result<EdgeSet>;
}

impl<S: NeighborSearch + ?Sized> NeighborSearch for &S {
    fn search(
        &self,
        ctx: &ComputeContext,
        query: &Embeddings,
        query_ids: &[u32],
        candidates: &Embeddings,
        radius: f32,
        k: usize,
    ) -> Result<EdgeSet> {
        (**self).search(ctx, query, query_ids, candidates, radius, k)
    }
}

/// Exact radius-bounded k-nearest search by full scan.
///
/// `O(queries × candidates)`; meant for tests and small batches.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceSearch {
    pub remove_self_loops: bool,
}

impl Default for BruteForceSearch {
    fn default() -> Self {
        Self { remove_self_loops: true }
    }
}

impl NeighborSearch for BruteForceSearch {
    fn search(
        &self,
        _ctx: &ComputeContext,
        query: &Embeddings,
        query_ids: &[u32],
        candidates: &Embeddings,
        radius: f32,
        k: usize,
    ) -> Result<EdgeSet> {
        if query.len() != query_ids.len() {
            return Err(Error::LengthMismatch {
                what: "query ids",
                expected: query.len(),
                got: query_ids.len(),
            });
        }
        if !query.is_empty() && !candidates.is_empty() && query.dim() != candidates.dim() {
            return Err(Error::DimensionMismatch { expected: query.dim(), got: candidates.dim() });
        }

        let r2 = radius * radius;
        let mut edges = EdgeSet::new();
        let mut hits: Vec<(f32, u32)> = Vec::new();

        for (row, &qid) in query_ids.iter().enumerate() {
            let q = query.node(row as u32)?;
            hits.clear();
            for c in 0..candidates.len() as u32 {
                let d = squared_distance(q, candidates.node(c)?);
                if d <= r2 {
                    hits.push((d, c));
                }
            }
            hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            hits.truncate(k);
            for &(_, c) in &hits {
                if self.remove_self_loops && c == qid {
                    continue;
                }
                edges.push(Edge::new(qid, c));
            }
        }
        Ok(edges)
    }
}

// ============================================================================
// Sampler
// ============================================================================

/// Radius, neighbour cap and positive weight for one embedding subspace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningParams {
    pub radius: f32,
    pub k: usize,
    /// Weight given to appended truth edges.
    pub true_weight: f32,
}

impl MiningParams {
    pub fn spatial(config: &Config) -> Self {
        Self { radius: config.r_train, k: config.knn, true_weight: config.weight }
    }

    /// The topological subspace mines within its own margin.
    pub fn topological(config: &Config) -> Self {
        Self { radius: config.topo_margin, k: config.knn, true_weight: config.topo_weight }
    }
}

/// Builds per-batch training sets with an injected neighbour search.
pub struct TrainingPairSampler<S> {
    search: S,
    config: Config,
}

impl<S: NeighborSearch> TrainingPairSampler<S> {
    /// Validate the configuration and run the codec self-check.
    pub fn new(config: Config, search: S, ctx: &mut ComputeContext) -> Result<Self> {
        config.validate()?;
        codec::self_check(ctx.rng(), config.self_check_samples, codec::MAX_NODE_ID + 1)?;
        Ok(Self { search, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    /// Query nodes for this batch: shuffled, capped at `points_per_batch`.
    pub fn select_queries(&self, truth: &EdgeSet, num_nodes: usize, ctx: &mut ComputeContext) -> Vec<u32> {
        let mut queries: Vec<u32> = match self.config.query_selection {
            QuerySelection::TruthEndpoints => truth.unique_nodes(),
            QuerySelection::AllNodes => (0..num_nodes as u32).collect(),
        };
        queries.shuffle(ctx.rng());
        queries.truncate(self.config.points_per_batch);
        queries
    }

    /// Build the training set for one subspace of `batch`.
    ///
    /// `emb_a` embeds the query side, `emb_b` the candidate side; both are
    /// indexed by node id.
    pub fn sample(
        &self,
        batch: &EventGraph,
        emb_a: &Embeddings,
        emb_b: &Embeddings,
        params: MiningParams,
        ctx: &mut ComputeContext,
    ) -> Result<TrainingSet> {
        let truth = &batch.signal_true_edges;
        let queries = self.select_queries(truth, emb_a.len(), ctx);
        let mut pool = EdgeSet::new();

        if self.config.hard_negative_mining {
            let mined = self.mine(&queries, emb_a, emb_b, params, ctx)?;
            pool.extend_from(&mined);
        }

        if self.config.random_pairs {
            let random = self.random_pairs(&queries, emb_b.len(), ctx);
            pool.extend_from(&random);
        }

        tracing::debug!(
            event = %batch.event_id,
            queries = queries.len(),
            pool = pool.len(),
            truth = truth.len(),
            "candidate pool assembled"
        );
        assemble_training_set(&pool, truth, params.true_weight)
    }

    fn mine(
        &self,
        queries: &[u32],
        emb_a: &Embeddings,
        emb_b: &Embeddings,
        params: MiningParams,
        ctx: &ComputeContext,
    ) -> Result<EdgeSet> {
        let query_rows = emb_a.select(queries)?;
        self.search.search(ctx, &query_rows, queries, emb_b, params.radius, params.k)
    }

    /// `⌊randomisation · |queries|⌋` pairs, sources uniform over the
    /// queries and destinations uniform over all candidate rows.
    fn random_pairs(&self, queries: &[u32], num_candidates: usize, ctx: &mut ComputeContext) -> EdgeSet {
        if queries.is_empty() || num_candidates == 0 {
            return EdgeSet::new();
        }
        let n_random = (self.config.randomisation * queries.len() as f32).floor() as usize;
        let rng = ctx.rng();
        (0..n_random)
            .map(|_| {
                let src = queries[rng.gen_range(0..queries.len())];
                let dst = rng.gen_range(0..num_candidates as u32);
                Edge::new(src, dst)
            })
            .collect()
    }
}

/// Label `pool` against `truth`, then append every truth edge whose exact
/// orientation the labeled pool lacks.
///
/// Pool edges weigh 1.0 when true and 0.0 when false; appended truth
/// edges weigh `true_weight`.
pub fn assemble_training_set(pool: &EdgeSet, truth: &EdgeSet, true_weight: f32) -> Result<TrainingSet> {
    let labeled = reconcile(pool, truth)?;
    let present = CodeSet::from_edges(labeled.edges())?;
    let (mut edges, mut labels) = labeled.into_parts();
    let mut weights: Vec<f32> = labels.iter().map(|&y| if y { 1.0 } else { 0.0 }).collect();

    let mut appended = 0usize;
    for &edge in truth {
        if !present.contains(codec::encode_edge(edge)?) {
            edges.push(edge);
            labels.push(true);
            weights.push(true_weight);
            appended += 1;
        }
    }

    tracing::debug!(reconciled = edges.len() - appended, appended, "truth pairs guaranteed");
    TrainingSet::new(edges, labels, weights)
}
