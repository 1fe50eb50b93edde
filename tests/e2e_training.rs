//! Training-pair sampling, loss and the metric learner end to end.

use pretty_assertions::assert_eq;
use trackgraph::algebra::CodeSet;
use trackgraph::codec;
use trackgraph::{
    assemble_training_set, BruteForceSearch, ComputeContext, Config, EdgeSet, Embeddings,
    EmbeddingModel, EmbeddingOutputs, Error, EventGraph, MemoryMetricsSink, Metric,
    MetricLearner, NeighborSearch, TrainingPairSampler,
};
use trackgraph::sampler::MiningParams;

// ============================================================================
// Fixtures
// ============================================================================

/// Returns a fixed candidate list regardless of the query.
struct ScriptedSearch(EdgeSet);

impl NeighborSearch for ScriptedSearch {
    fn search(
        &self,
        _ctx: &ComputeContext,
        _query: &Embeddings,
        _query_ids: &[u32],
        _candidates: &Embeddings,
        _radius: f32,
        _k: usize,
    ) -> trackgraph::Result<EdgeSet> {
        Ok(self.0.clone())
    }
}

/// Uses the node features as every embedding.
struct FeatureModel;

impl EmbeddingModel for FeatureModel {
    fn forward(&self, _ctx: &ComputeContext, batch: &EventGraph) -> trackgraph::Result<EmbeddingOutputs> {
        let x = batch.node_features.clone();
        Ok(EmbeddingOutputs { spatial_a: x.clone(), spatial_b: x.clone(), topo_a: x.clone(), topo_b: x })
    }
}

/// Six hits on a line, one unit apart, truth along the chain.
fn line_event() -> EventGraph {
    let features = Embeddings::new(1, (0..6).map(|i| i as f32).collect()).unwrap();
    EventGraph::new("event000000001")
        .with_features(features)
        .with_truth(EdgeSet::from_pairs((0..5).map(|i| (i, i + 1))))
}

fn truth_codes_present(set: &trackgraph::TrainingSet, truth: &EdgeSet) -> bool {
    let codes = CodeSet::from_edges(set.edges()).unwrap();
    truth.iter().all(|&e| codes.contains(codec::encode_edge(e).unwrap()))
}

// ============================================================================
// 1. Composition: mined + random + missing truth
// ============================================================================

#[test]
fn test_training_set_composition() {
    let truth = EdgeSet::from_pairs([(0, 1), (2, 3), (4, 5)]);
    // 8 mined, two of them truth edges in their exact orientation
    let mined = EdgeSet::from_pairs([(0, 1), (2, 3), (0, 6), (1, 7), (2, 8), (3, 9), (4, 6), (5, 8)]);
    let random = EdgeSet::from_pairs([(0, 9), (1, 6), (3, 7), (4, 8)]);

    let mut pool = mined.clone();
    pool.extend_from(&random);
    let set = assemble_training_set(&pool, &truth, 1.0).unwrap();

    assert_eq!(set.len(), 8 + 4 + 1);
    assert_eq!(set.positives(), 3);

    let truth_index = CodeSet::from_edges(&truth).unwrap();
    for (edge, &label) in set.edges().iter().zip(set.labels()) {
        assert_eq!(label, truth_index.contains(codec::encode_edge(*edge).unwrap()), "edge {edge}");
    }
}

#[test]
fn test_sample_appends_missing_truth_to_mined_pool() {
    let mut ctx = ComputeContext::cpu(7);
    let mined = EdgeSet::from_pairs([(0, 1), (2, 3), (0, 6), (1, 7), (2, 8), (3, 9), (4, 6), (5, 8)]);
    let config = Config { random_pairs: false, ..Config::default() };
    let sampler = TrainingPairSampler::new(config, ScriptedSearch(mined), &mut ctx).unwrap();

    let mut batch = EventGraph::new("evt")
        .with_features(Embeddings::new(1, (0..10).map(|i| i as f32).collect()).unwrap());
    batch.signal_true_edges = EdgeSet::from_pairs([(0, 1), (2, 3), (4, 5)]);

    let x = batch.node_features.clone();
    let set = sampler
        .sample(&batch, &x, &x, MiningParams::spatial(sampler.config()), &mut ctx)
        .unwrap();

    assert_eq!(set.len(), 9);
    assert_eq!(set.positives(), 3);
    assert_eq!(set.weights().iter().filter(|&&w| w == 1.0).count(), 3);
}

#[test]
fn test_sample_mined_and_random_pairs_exact_count() {
    let mut ctx = ComputeContext::cpu(11);
    // Mined edges stay clear of the query nodes in both orientations
    let mined = EdgeSet::from_pairs((0..8).map(|i| (10 + i, 20 + i)));
    // Two truth endpoints, so exactly one random pair
    let config = Config { randomisation: 0.5, ..Config::default() };
    assert!(config.hard_negative_mining && config.random_pairs);
    let sampler = TrainingPairSampler::new(config, ScriptedSearch(mined.clone()), &mut ctx).unwrap();

    let mut batch = EventGraph::new("evt");
    batch.signal_true_edges = EdgeSet::from_pairs([(5, 6)]);
    let emb_a = Embeddings::new(1, (0..7).map(|i| i as f32).collect()).unwrap();
    // One candidate row: every random pair lands on node 0
    let emb_b = Embeddings::new(1, vec![0.0]).unwrap();

    let set = sampler
        .sample(&batch, &emb_a, &emb_b, MiningParams::spatial(sampler.config()), &mut ctx)
        .unwrap();

    let (n_mined, n_random, n_missing) = (mined.len(), 1, 1);
    assert_eq!(set.len(), n_mined + n_random + n_missing);
    assert_eq!(set.positives(), 1);

    let random: Vec<_> = set.edges().iter().filter(|e| e.dst == 0).collect();
    assert_eq!(random.len(), 1);
    assert!(random[0].src == 5 || random[0].src == 6);
    assert_eq!(set.edges().iter().last().map(|e| (e.src, e.dst)), Some((5, 6)));
    assert_eq!(set.weights().iter().filter(|&&w| w == 0.0).count(), n_mined + n_random);
}

#[test]
fn test_sample_with_random_pairs_guarantees_truth() {
    let mut ctx = ComputeContext::cpu(8);
    let config = Config { r_train: 1.5, randomisation: 2.0, ..Config::default() };
    let sampler = TrainingPairSampler::new(config, BruteForceSearch::default(), &mut ctx).unwrap();
    let batch = line_event();
    let x = batch.node_features.clone();

    let set = sampler
        .sample(&batch, &x, &x, MiningParams::spatial(sampler.config()), &mut ctx)
        .unwrap();

    assert!(truth_codes_present(&set, &batch.signal_true_edges));
    assert!(set.positives() >= batch.signal_true_edges.len());
}

// ============================================================================
// 2. Metric learner
// ============================================================================

fn learner(config: Config, ctx: &mut ComputeContext) -> MetricLearner<FeatureModel, BruteForceSearch> {
    MetricLearner::new(config, FeatureModel, BruteForceSearch::default(), ctx).unwrap()
}

#[test]
fn test_step_sums_both_subspaces() {
    let mut ctx = ComputeContext::cpu(21);
    let config = Config { r_train: 1.5, topo_margin: 1.5, ..Config::default() };
    let learner = learner(config, &mut ctx);

    let step = learner.step(&line_event(), &mut ctx).unwrap();

    assert!(step.total.is_finite());
    assert!((step.total - (step.spatial + step.topological)).abs() < 1e-6);
    // Every positive sits at squared distance 1
    assert!(step.spatial >= 1.0);
    assert!(step.spatial_pairs >= 10);
    assert!(step.topo_pairs >= 10);
}

#[test]
fn test_evaluate_reports_metrics() {
    let mut ctx = ComputeContext::cpu(22);
    let config = Config { knn_radius_eval: 1.5, knn_eval: 10, ..Config::default() };
    let learner = learner(config, &mut ctx);
    let mut sink = MemoryMetricsSink::new();

    let report = learner.evaluate(&line_event(), &mut ctx, &mut sink).unwrap();

    // Both orientations of each neighbour pair are predicted; one survives
    assert_eq!(report.predicted.len(), 5);
    assert_eq!(report.purity, Metric::Value(1.0));
    assert_eq!(report.efficiency, Metric::Value(0.5));
    assert!((report.val_loss - 1.0).abs() < 1e-6);
    assert_eq!(report.module_veto_purity, None);

    assert_eq!(sink.get("pur"), Some(Metric::Value(1.0)));
    assert_eq!(sink.get("topo_eff"), Some(Metric::Value(0.5)));
    assert!(sink.get("module_veto_pur").is_none());
}

#[test]
fn test_evaluate_module_veto() {
    let mut ctx = ComputeContext::cpu(23);
    let config = Config { knn_radius_eval: 1.5, module_veto: true, ..Config::default() };
    let learner = learner(config, &mut ctx);
    let mut sink = MemoryMetricsSink::new();

    // Without module ids the metric cannot be computed
    let err = learner.evaluate(&line_event(), &mut ctx, &mut sink).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let event = line_event().with_modules(vec![0, 0, 1, 1, 2, 2]);
    let report = learner.evaluate(&event, &mut ctx, &mut sink).unwrap();
    // 5 true positives over the 2 kept edges that cross modules
    assert_eq!(report.module_veto_purity, Some(Metric::Value(2.5)));
}

// ============================================================================
// 3. Configuration
// ============================================================================

#[test]
fn test_config_from_json() {
    let config = Config::from_json_str(r#"{"margin": 0.5, "query_selection": "all_nodes"}"#).unwrap();
    assert_eq!(config.margin, 0.5);
    assert_eq!(config.spatial_margin_sq(), 0.25);
    assert_eq!(config.query_selection, trackgraph::QuerySelection::AllNodes);
}

#[test]
fn test_config_rejects_bad_values() {
    assert!(matches!(
        Config::from_json_str(r#"{"target_purity": 1.5}"#),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        Config::from_json_str(r#"{"margin": -1.0}"#),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        Config::from_json_str(r#"{"unknown_flag": true}"#),
        Err(Error::Serialization(_))
    ));
}
