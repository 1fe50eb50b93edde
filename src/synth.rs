//! # Quality-Controlled Graph Synthesis
//!
//! Builds an edge set that recovers every truth edge (efficiency 1.0) and
//! pads it with candidate false edges up to a target purity:
//!
//! ```text
//! U      = union(codes(T), codes(C))            sorted, distinct
//! U      = [ true part | false part ]           stable partition
//! n_false = ⌊ t · (1 − p) / p ⌋
//! keep   = [ true part | false part[..min(f_avail, n_false)] ]
//! out    = shuffle(keep)                        one shared permutation
//! ```
//!
//! The false part is truncated from its tail, not sampled; only the
//! retained set is shuffled. With too few false edges available, all of
//! them are kept and purity lands above the target.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::algebra::{self, CodeSet};
use crate::codec;
use crate::config::{self, Config};
use crate::context::ComputeContext;
use crate::metrics::{self, Metric};
use crate::model::{EdgeSet, LabeledEdgeSet, PairCode};
use crate::Result;

/// Efficiency-1 graph builder at a fixed target purity.
#[derive(Debug, Clone)]
pub struct GraphSynthesizer {
    target_purity: f64,
}

/// A synthesized graph and the counts that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    pub graph: LabeledEdgeSet,
    /// Distinct truth edges (`t`).
    pub truth_count: usize,
    /// Distinct candidate edges not in the truth (`f_avail`).
    pub false_available: usize,
    /// False edges the target purity asks for (`n_false`).
    pub false_budget: usize,
    pub efficiency: Metric,
    pub purity: Metric,
}

/// Serializable counts of one synthesis, without the edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSummary {
    pub truth_count: usize,
    pub false_available: usize,
    pub false_budget: usize,
    pub edges: usize,
    pub purity: Metric,
}

impl SynthesisReport {
    pub fn summary(&self) -> SynthesisSummary {
        SynthesisSummary {
            truth_count: self.truth_count,
            false_available: self.false_available,
            false_budget: self.false_budget,
            edges: self.graph.len(),
            purity: self.purity,
        }
    }
}

impl GraphSynthesizer {
    /// Validate the purity and run the codec self-check.
    pub fn new(target_purity: f64, self_check_samples: usize, ctx: &mut ComputeContext) -> Result<Self> {
        config::validate_purity(target_purity)?;
        codec::self_check(ctx.rng(), self_check_samples, codec::MAX_NODE_ID + 1)?;
        tracing::info!(target_purity, "graph synthesizer ready, efficiency fixed at 1.0");
        Ok(Self { target_purity })
    }

    pub fn from_config(config: &Config, ctx: &mut ComputeContext) -> Result<Self> {
        config.validate()?;
        Self::new(config.target_purity, config.self_check_samples, ctx)
    }

    pub fn target_purity(&self) -> f64 {
        self.target_purity
    }

    /// `⌊ t · (1 − p) / p ⌋`
    pub fn false_budget(&self, truth_count: usize) -> usize {
        let p = self.target_purity;
        (truth_count as f64 * (1.0 - p) / p).floor() as usize
    }

    /// Combine `truth` with `candidates` into a labeled graph holding every
    /// truth edge.
    pub fn synthesize(
        &self,
        truth: &EdgeSet,
        candidates: &EdgeSet,
        ctx: &mut ComputeContext,
    ) -> Result<SynthesisReport> {
        let true_codes = algebra::unique(&algebra::encode_edges(truth)?);
        let candidate_codes = algebra::encode_edges(candidates)?;
        let truth_index = CodeSet::from_codes(&true_codes);

        // True codes first, false codes after, each ascending
        let (mut codes, false_part): (Vec<PairCode>, Vec<PairCode>) =
            algebra::union(&true_codes, &candidate_codes)
                .into_iter()
                .partition(|&c| truth_index.contains(c));

        let truth_count = codes.len();
        let false_available = false_part.len();
        let false_budget = self.false_budget(truth_count);
        let kept_false = false_available.min(false_budget);

        codes.extend_from_slice(&false_part[..kept_false]);
        let mut labels = vec![true; truth_count];
        labels.resize(truth_count + kept_false, false);

        let mut order: Vec<usize> = (0..codes.len()).collect();
        order.shuffle(ctx.rng());
        let codes: Vec<PairCode> = order.iter().map(|&i| codes[i]).collect();
        let labels: Vec<bool> = order.iter().map(|&i| labels[i]).collect();

        let graph = LabeledEdgeSet::new(algebra::decode_back(&codes)?, labels)?;
        let report = SynthesisReport {
            efficiency: metrics::efficiency(truth_count, truth_count),
            purity: metrics::purity(truth_count, graph.len()),
            graph,
            truth_count,
            false_available,
            false_budget,
        };

        if false_available < false_budget {
            tracing::debug!(
                false_available,
                false_budget,
                purity = %report.purity,
                "false-edge supply short of budget, purity above target"
            );
        }
        Ok(report)
    }
}
