//! Quality-controlled graph synthesis.

use trackgraph::algebra::{self, CodeSet};
use trackgraph::{ComputeContext, EdgeSet, GraphSynthesizer, Metric};

/// Ten truth edges on a chain.
fn chain_truth() -> EdgeSet {
    EdgeSet::from_pairs((0..10).map(|i| (i, i + 1)))
}

/// `n` candidate edges disjoint from the chain in both orientations.
fn false_candidates(n: u32) -> EdgeSet {
    EdgeSet::from_pairs((0..n).map(|i| (100 + i, 200 + i)))
}

fn synthesizer(p: f64, seed: u64) -> (GraphSynthesizer, ComputeContext) {
    let mut ctx = ComputeContext::cpu(seed);
    let synth = GraphSynthesizer::new(p, 100, &mut ctx).unwrap();
    (synth, ctx)
}

// ============================================================================
// 1. Purity met exactly when enough false edges exist
// ============================================================================

#[test]
fn test_half_purity_with_ample_false_edges() {
    let (synth, mut ctx) = synthesizer(0.5, 1);
    let report = synth.synthesize(&chain_truth(), &false_candidates(20), &mut ctx).unwrap();

    assert_eq!(report.graph.len(), 20);
    assert_eq!(report.graph.true_count(), 10);
    assert_eq!(report.efficiency, Metric::Value(1.0));
    assert_eq!(report.purity, Metric::Value(0.5));
}

// ============================================================================
// 2. Purity above target when false edges run short
// ============================================================================

#[test]
fn test_short_false_supply_keeps_all_of_it() {
    let (synth, mut ctx) = synthesizer(0.5, 2);
    let report = synth.synthesize(&chain_truth(), &false_candidates(2), &mut ctx).unwrap();

    assert_eq!(report.graph.len(), 12);
    assert_eq!(report.false_available, 2);
    assert_eq!(report.false_budget, 10);
    assert_eq!(report.purity, Metric::Value(10.0 / 12.0));
}

// ============================================================================
// 3. Every truth edge recovered, labels consistent with truth
// ============================================================================

#[test]
fn test_output_contains_every_truth_edge() {
    let truth = chain_truth();
    let mut candidates = false_candidates(15);
    // Candidates overlapping the truth do not count as false
    candidates.extend_from(&EdgeSet::from_pairs([(0, 1), (4, 5)]));

    let (synth, mut ctx) = synthesizer(0.4, 3);
    let report = synth.synthesize(&truth, &candidates, &mut ctx).unwrap();

    let out_codes = algebra::encode_edges(report.graph.edges()).unwrap();
    let truth_codes = algebra::encode_edges(&truth).unwrap();
    assert_eq!(algebra::intersection(&out_codes, &truth_codes).len(), truth_codes.len());

    let truth_index = CodeSet::from_codes(&truth_codes);
    for (code, &label) in out_codes.iter().zip(report.graph.labels()) {
        assert_eq!(truth_index.contains(*code), label);
    }

    assert_eq!(report.false_available, 15);
    // 10 * 0.6 / 0.4 = 15
    assert_eq!(report.false_budget, 15);
    assert_eq!(report.graph.len(), 25);
}

// ============================================================================
// 4. Shuffle moves edges and labels together
// ============================================================================

#[test]
fn test_different_seeds_same_content() {
    let truth = chain_truth();
    let candidates = false_candidates(30);

    let (synth, mut ctx_a) = synthesizer(0.5, 10);
    let (_, mut ctx_b) = synthesizer(0.5, 20);
    let a = synth.synthesize(&truth, &candidates, &mut ctx_a).unwrap();
    let b = synth.synthesize(&truth, &candidates, &mut ctx_b).unwrap();

    let sorted = |set: &trackgraph::LabeledEdgeSet| {
        let mut v: Vec<_> = set.iter().collect();
        v.sort();
        v
    };
    assert_eq!(sorted(&a.graph), sorted(&b.graph));
}
