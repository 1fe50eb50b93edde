//! # Collection Pipeline
//!
//! Bulk operations over a [`GraphStore`]: loading a collection with
//! per-item failure isolation, and the graph-modifier pass that rewrites
//! every event into an efficiency-1 graph at the synthesizer's purity.
//!
//! Both return an immutable manifest describing what happened instead of
//! mutating shared bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ComputeContext;
use crate::model::EventGraph;
use crate::storage::GraphStore;
use crate::synth::{GraphSynthesizer, SynthesisSummary};
use crate::Result;

// ============================================================================
// Bulk load
// ============================================================================

/// Per-item result of a bulk load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(EventGraph),
    Skipped { id: String, reason: String },
}

/// What a bulk load produced, fixed once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadManifest {
    loaded: Vec<String>,
    skipped: Vec<(String, String)>,
    built_at: DateTime<Utc>,
}

impl LoadManifest {
    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    /// `(id, reason)` per skipped item.
    pub fn skipped(&self) -> &[(String, String)] {
        &self.skipped
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Load the first `limit` items (by ascending id) of `store`.
///
/// Items that fail to load for any reason are skipped with a warning and
/// recorded in the manifest; only a failure to list the store aborts.
pub async fn load_collection<S: GraphStore + ?Sized>(
    store: &S,
    limit: Option<usize>,
) -> Result<(Vec<EventGraph>, LoadManifest)> {
    let mut ids = store.list().await?;
    if let Some(limit) = limit {
        ids.truncate(limit);
    }

    let mut graphs = Vec::with_capacity(ids.len());
    let mut loaded = Vec::with_capacity(ids.len());
    let mut skipped = Vec::new();

    for id in ids {
        match load_one(store, &id).await {
            LoadOutcome::Loaded(graph) => {
                loaded.push(id);
                graphs.push(graph);
            }
            LoadOutcome::Skipped { id, reason } => {
                tracing::warn!(%id, %reason, "skipping unreadable event graph");
                skipped.push((id, reason));
            }
        }
    }

    let manifest = LoadManifest { loaded, skipped, built_at: Utc::now() };
    tracing::info!(
        loaded = manifest.loaded.len(),
        skipped = manifest.skipped.len(),
        "collection loaded"
    );
    Ok((graphs, manifest))
}

/// Load one item. Any failure to produce the graph (unreadable, undecodable,
/// vanished or rejected by the store) becomes `Skipped` with its reason.
async fn load_one<S: GraphStore + ?Sized>(store: &S, id: &str) -> LoadOutcome {
    match store.load(id).await {
        Ok(graph) => LoadOutcome::Loaded(graph),
        Err(e) => LoadOutcome::Skipped { id: id.to_string(), reason: e.to_string() },
    }
}

// ============================================================================
// Graph modifier
// ============================================================================

/// Result of a modifier pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyManifest {
    written: Vec<(String, SynthesisSummary)>,
    skipped: Vec<(String, String)>,
    target_purity: f64,
    built_at: DateTime<Utc>,
}

impl ModifyManifest {
    /// `(id, summary)` per rewritten event.
    pub fn written(&self) -> &[(String, SynthesisSummary)] {
        &self.written
    }

    pub fn skipped(&self) -> &[(String, String)] {
        &self.skipped
    }

    pub fn target_purity(&self) -> f64 {
        self.target_purity
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Rewrites a collection into efficiency-1 graphs.
///
/// For every event, the module-wise truth and the candidate `edge_index`
/// go through [`GraphSynthesizer::synthesize`]; the result replaces
/// `edge_index` and `labels`, and the event is saved under the same id in
/// the output store.
pub struct GraphModifier<I, O> {
    input: I,
    output: O,
    synthesizer: GraphSynthesizer,
}

impl<I: GraphStore, O: GraphStore> GraphModifier<I, O> {
    pub fn new(input: I, output: O, synthesizer: GraphSynthesizer) -> Self {
        Self { input, output, synthesizer }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Process the first `limit` events of the input store.
    ///
    /// Unloadable events are skipped. A synthesis or save failure aborts
    /// the pass with that error; events written before it stay in the
    /// output store and no manifest is returned for them. Saves replace
    /// by id, so a rerun overwrites them.
    pub async fn run(&self, ctx: &mut ComputeContext, limit: Option<usize>) -> Result<ModifyManifest> {
        let mut ids = self.input.list().await?;
        if let Some(limit) = limit {
            ids.truncate(limit);
        }

        let mut written = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();

        for id in ids {
            let mut event = match load_one(&self.input, &id).await {
                LoadOutcome::Loaded(event) => event,
                LoadOutcome::Skipped { id, reason } => {
                    tracing::warn!(%id, %reason, "skipping unreadable event graph");
                    skipped.push((id, reason));
                    continue;
                }
            };

            let report = self.synthesizer.synthesize(&event.true_edges, &event.edge_index, ctx)?;
            let summary = report.summary();
            let (edges, labels) = report.graph.into_parts();
            event.edge_index = edges;
            event.labels = Some(labels);

            self.output.save(&id, &event).await?;
            tracing::debug!(
                %id,
                edges = summary.edges,
                truth = summary.truth_count,
                purity = %summary.purity,
                "event modified"
            );
            written.push((id, summary));
        }

        let manifest = ModifyManifest {
            written,
            skipped,
            target_purity: self.synthesizer.target_purity(),
            built_at: Utc::now(),
        };
        tracing::info!(
            written = manifest.written.len(),
            skipped = manifest.skipped.len(),
            target_purity = manifest.target_purity,
            "graph modifier pass complete"
        );
        Ok(manifest)
    }
}
