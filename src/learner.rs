//! # Metric Learner
//!
//! The training-module contract, as composition instead of a framework
//! base class: an `EmbeddingModel` and a `NeighborSearch` are injected,
//! and the learner exposes `forward`, `step` and `evaluate`. Optimizer,
//! scheduling and batch iteration belong to whoever drives it.
//!
//! ```text
//! batch ─► model.forward ─► (spatial_a, spatial_b, topo_a, topo_b)
//!                                 │                     │
//!                        sampler (r_train)      sampler (topo_margin)
//!                                 │                     │
//!                         hinge(margin²)         hinge(topo_margin²)
//!                                 └────────── + ────────┘ ─► step loss
//! ```

use std::collections::BTreeMap;

use crate::config::Config;
use crate::context::ComputeContext;
use crate::loss::{self, ContrastiveLoss};
use crate::metrics::{self, Metric, MetricsSink};
use crate::model::{EdgeSet, Embeddings, EventGraph, LabeledEdgeSet, TrainingSet};
use crate::reconcile::reconcile;
use crate::sampler::{MiningParams, NeighborSearch, TrainingPairSampler};
use crate::{Error, Result};

/// Embeddings for both subspaces; `_a` is the query side, `_b` the
/// candidate side.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutputs {
    pub spatial_a: Embeddings,
    pub spatial_b: Embeddings,
    pub topo_a: Embeddings,
    pub topo_b: Embeddings,
}

/// The embedding network, seen from the outside.
pub trait EmbeddingModel {
    fn forward(&self, ctx: &ComputeContext, batch: &EventGraph) -> Result<EmbeddingOutputs>;
}

/// Losses of one training step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepLoss {
    pub spatial: f32,
    pub topological: f32,
    pub total: f32,
    pub spatial_pairs: usize,
    pub topo_pairs: usize,
}

/// Validation outcome for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub val_loss: f32,
    pub efficiency: Metric,
    pub purity: Metric,
    pub topo_efficiency: Metric,
    pub topo_purity: Metric,
    /// Present only with `module_veto` enabled.
    pub module_veto_purity: Option<Metric>,
    /// Spatial graph, reconciled against the truth.
    pub predicted: LabeledEdgeSet,
    /// Squared distances aligned with `predicted`.
    pub distances: Vec<f32>,
}

impl EvaluationReport {
    /// Metrics under the keys reported to a sink.
    pub fn to_metrics(&self) -> BTreeMap<String, Metric> {
        let mut out = BTreeMap::new();
        out.insert("val_loss".to_string(), Metric::from(self.val_loss));
        out.insert("eff".to_string(), self.efficiency);
        out.insert("pur".to_string(), self.purity);
        out.insert("topo_eff".to_string(), self.topo_efficiency);
        out.insert("topo_pur".to_string(), self.topo_purity);
        if let Some(m) = self.module_veto_purity {
            out.insert("module_veto_pur".to_string(), m);
        }
        out
    }
}

pub struct MetricLearner<M, S> {
    model: M,
    sampler: TrainingPairSampler<S>,
    loss: ContrastiveLoss,
}

impl<M: EmbeddingModel, S: NeighborSearch> MetricLearner<M, S> {
    pub fn new(config: Config, model: M, search: S, ctx: &mut ComputeContext) -> Result<Self> {
        let loss = ContrastiveLoss::from_config(&config);
        let sampler = TrainingPairSampler::new(config, search, ctx)?;
        Ok(Self { model, sampler, loss })
    }

    pub fn config(&self) -> &Config {
        self.sampler.config()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn forward(&self, ctx: &ComputeContext, batch: &EventGraph) -> Result<EmbeddingOutputs> {
        self.model.forward(ctx, batch)
    }

    /// Spatial and topological training sets for one batch.
    pub fn training_sets(
        &self,
        batch: &EventGraph,
        outputs: &EmbeddingOutputs,
        ctx: &mut ComputeContext,
    ) -> Result<(TrainingSet, TrainingSet)> {
        let config = self.config();
        let spatial = self.sampler.sample(
            batch,
            &outputs.spatial_a,
            &outputs.spatial_b,
            MiningParams::spatial(config),
            ctx,
        )?;
        let topo = self.sampler.sample(
            batch,
            &outputs.topo_a,
            &outputs.topo_b,
            MiningParams::topological(config),
            ctx,
        )?;
        Ok((spatial, topo))
    }

    /// Forward, sample both subspaces, and sum their hinge losses.
    pub fn step(&self, batch: &EventGraph, ctx: &mut ComputeContext) -> Result<StepLoss> {
        let outputs = self.forward(ctx, batch)?;
        let (spatial_set, topo_set) = self.training_sets(batch, &outputs, ctx)?;

        let spatial_hinge = loss::hinge_distance(
            &outputs.spatial_a,
            &outputs.spatial_b,
            spatial_set.edges(),
            spatial_set.labels(),
        )?;
        let topo_hinge = loss::hinge_distance(
            &outputs.topo_a,
            &outputs.topo_b,
            topo_set.edges(),
            topo_set.labels(),
        )?;

        let spatial = self.loss.spatial(&spatial_hinge)?;
        let topological = self.loss.topological(&topo_hinge)?;
        let step = StepLoss {
            spatial,
            topological,
            total: spatial + topological,
            spatial_pairs: spatial_set.len(),
            topo_pairs: topo_set.len(),
        };
        tracing::debug!(
            event = %batch.event_id,
            spatial = step.spatial,
            topological = step.topological,
            total = step.total,
            "training step"
        );
        Ok(step)
    }

    /// Build the full evaluation graph in both subspaces, score it against
    /// the truth and report the metrics to `sink`.
    pub fn evaluate(
        &self,
        batch: &EventGraph,
        ctx: &mut ComputeContext,
        sink: &mut dyn MetricsSink,
    ) -> Result<EvaluationReport> {
        let config = self.config();
        let outputs = self.forward(ctx, batch)?;
        let truth = &batch.signal_true_edges;

        let spatial = self.full_graph(ctx, &outputs.spatial_a, &outputs.spatial_b, truth)?;
        let topo = self.full_graph(ctx, &outputs.topo_a, &outputs.topo_b, truth)?;

        let hinge = loss::hinge_distance(
            &outputs.spatial_a,
            &outputs.spatial_b,
            spatial.edges(),
            spatial.labels(),
        )?;
        let val_loss =
            loss::hinge_embedding_loss(&hinge.targets, &hinge.distances, config.spatial_margin_sq())?;

        let true_positives = spatial.true_count();
        let topo_true_positives = topo.true_count();

        let module_veto_purity = if config.module_veto {
            let modules = batch.modules.as_deref().ok_or_else(|| {
                Error::NotFound(format!("module ids for event {}", batch.event_id))
            })?;
            Some(metrics::module_veto_purity(true_positives, spatial.edges(), modules)?)
        } else {
            None
        };

        let report = EvaluationReport {
            val_loss,
            efficiency: metrics::efficiency(true_positives, truth.len()),
            purity: metrics::purity(true_positives, spatial.len()),
            topo_efficiency: metrics::efficiency(topo_true_positives, truth.len()),
            topo_purity: metrics::purity(topo_true_positives, topo.len()),
            module_veto_purity,
            predicted: spatial,
            distances: hinge.distances,
        };

        sink.record_all(&report.to_metrics());
        tracing::info!(
            event = %batch.event_id,
            efficiency = %report.efficiency,
            purity = %report.purity,
            "evaluated batch"
        );
        Ok(report)
    }

    fn full_graph(
        &self,
        ctx: &ComputeContext,
        emb_a: &Embeddings,
        emb_b: &Embeddings,
        truth: &EdgeSet,
    ) -> Result<LabeledEdgeSet> {
        let config = self.config();
        let all: Vec<u32> = (0..emb_a.len() as u32).collect();
        let edges = self.sampler.search().search(
            ctx,
            emb_a,
            &all,
            emb_b,
            config.knn_radius_eval,
            config.knn_eval,
        )?;
        reconcile(&edges, truth)
    }
}
