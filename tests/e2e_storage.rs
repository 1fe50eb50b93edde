//! Bulk load and the graph-modifier pass over graph stores.

use async_trait::async_trait;
use trackgraph::algebra::{self, CodeSet};
use trackgraph::{
    codec, load_collection, ComputeContext, EdgeSet, Error, EventGraph, GraphModifier, GraphStore,
    GraphSynthesizer, MemoryGraphStore, Metric,
};

/// Memory store that refuses to save one id.
struct RejectingStore {
    inner: MemoryGraphStore,
    reject: &'static str,
}

#[async_trait]
impl GraphStore for RejectingStore {
    async fn list(&self) -> trackgraph::Result<Vec<String>> {
        self.inner.list().await
    }

    async fn load(&self, id: &str) -> trackgraph::Result<EventGraph> {
        self.inner.load(id).await
    }

    async fn save(&self, id: &str, graph: &EventGraph) -> trackgraph::Result<()> {
        if id == self.reject {
            return Err(Error::Storage(format!("disk full writing {id}")));
        }
        self.inner.save(id, graph).await
    }
}

fn event(id: &str, offset: u32) -> EventGraph {
    let truth = EdgeSet::from_pairs((0..10).map(|i| (offset + i, offset + i + 1)));
    let candidates = EdgeSet::from_pairs((0..20).map(|i| (offset + 100 + i, offset + 200 + i)));
    EventGraph::new(id).with_truth(truth).with_edges(candidates)
}

async fn seeded_store() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    store.save("event000000001", &event("event000000001", 0)).await.unwrap();
    store.save("event000000002", &event("event000000002", 5)).await.unwrap();
    store.insert_raw("event000000003", b"\x00\x01 truncated".to_vec());
    store.save("event000000004", &event("event000000004", 9)).await.unwrap();
    store
}

// ============================================================================
// 1. Bulk load isolates corrupt items
// ============================================================================

#[tokio::test]
async fn test_load_skips_corrupt_items() {
    let store = seeded_store().await;
    let (graphs, manifest) = load_collection(&store, None).await.unwrap();

    assert_eq!(graphs.len(), 3);
    assert_eq!(manifest.loaded(), &["event000000001", "event000000002", "event000000004"]);
    assert_eq!(manifest.skipped().len(), 1);
    assert_eq!(manifest.skipped()[0].0, "event000000003");
    assert!(!manifest.is_clean());
}

#[tokio::test]
async fn test_load_respects_limit() {
    let store = seeded_store().await;
    let (graphs, manifest) = load_collection(&store, Some(2)).await.unwrap();

    assert_eq!(graphs.len(), 2);
    assert!(manifest.is_clean());
    assert_eq!(graphs[1].event_id, "event000000002");
}

// ============================================================================
// 2. Graph modifier
// ============================================================================

#[tokio::test]
async fn test_modifier_writes_efficiency_one_graphs() {
    let input = seeded_store().await;
    let output = MemoryGraphStore::new();
    let mut ctx = ComputeContext::cpu(5);
    let synth = GraphSynthesizer::new(0.5, 100, &mut ctx).unwrap();

    let modifier = GraphModifier::new(input, output.clone(), synth);
    let manifest = modifier.run(&mut ctx, None).await.unwrap();

    assert_eq!(manifest.written().len(), 3);
    assert_eq!(manifest.skipped().len(), 1);
    assert_eq!(manifest.target_purity(), 0.5);
    assert_eq!(output.list().await.unwrap().len(), 3);

    for (id, summary) in manifest.written() {
        assert_eq!(summary.edges, 20);
        assert_eq!(summary.purity, Metric::Value(0.5));

        let modified = output.load(id).await.unwrap();
        let labels = modified.labels.as_ref().unwrap();
        assert_eq!(labels.len(), modified.edge_index.len());

        let out_codes = algebra::encode_edges(&modified.edge_index).unwrap();
        let truth_codes = algebra::encode_edges(&modified.true_edges).unwrap();
        assert_eq!(algebra::intersection(&out_codes, &truth_codes).len(), truth_codes.len());

        let truth_index = CodeSet::from_codes(&truth_codes);
        for (edge, &label) in modified.edge_index.iter().zip(labels) {
            assert_eq!(truth_index.contains(codec::encode_edge(*edge).unwrap()), label);
        }
    }
}

#[tokio::test]
async fn test_modifier_save_failure_keeps_earlier_writes() {
    let input = seeded_store().await;
    let output = MemoryGraphStore::new();
    let rejecting = RejectingStore { inner: output.clone(), reject: "event000000002" };
    let mut ctx = ComputeContext::cpu(7);
    let synth = GraphSynthesizer::new(0.5, 100, &mut ctx).unwrap();

    let err = GraphModifier::new(input, rejecting, synth).run(&mut ctx, None).await.unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(output.list().await.unwrap(), vec!["event000000001".to_string()]);
}

// ============================================================================
// 3. Directory stores
// ============================================================================

#[cfg(feature = "fs")]
#[tokio::test]
async fn test_load_skips_unreadable_file() {
    use trackgraph::storage::DirectoryGraphStore;

    let root = std::env::temp_dir().join(format!("trackgraph-e2e-io-{}", std::process::id()));
    let store = DirectoryGraphStore::open(&root).await.unwrap();
    store.save("event1", &event("event1", 0)).await.unwrap();
    store.save("event3", &event("event3", 2)).await.unwrap();
    // Listed like an item, but reading it is an I/O error
    tokio::fs::create_dir_all(root.join("event2.json")).await.unwrap();

    let (graphs, manifest) = load_collection(&store, None).await.unwrap();

    assert_eq!(graphs.len(), 2);
    assert_eq!(manifest.loaded(), &["event1", "event3"]);
    assert_eq!(manifest.skipped().len(), 1);
    assert_eq!(manifest.skipped()[0].0, "event2");

    let mut ctx = ComputeContext::cpu(8);
    let synth = GraphSynthesizer::new(0.5, 100, &mut ctx).unwrap();
    let modified = GraphModifier::new(store, MemoryGraphStore::new(), synth)
        .run(&mut ctx, None)
        .await
        .unwrap();
    assert_eq!(modified.written().len(), 2);
    assert_eq!(modified.skipped().len(), 1);

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[cfg(feature = "fs")]
#[tokio::test]
async fn test_modifier_between_directories() {
    use trackgraph::storage::DirectoryGraphStore;

    let root = std::env::temp_dir().join(format!("trackgraph-e2e-{}", std::process::id()));
    let input = DirectoryGraphStore::open(root.join("in")).await.unwrap();
    let output = DirectoryGraphStore::open(root.join("out")).await.unwrap();
    input.save("event000000001", &event("event000000001", 0)).await.unwrap();
    tokio::fs::write(input.root().join("event000000002.json"), b"{").await.unwrap();

    let mut ctx = ComputeContext::cpu(6);
    let synth = GraphSynthesizer::new(0.25, 100, &mut ctx).unwrap();
    let manifest = GraphModifier::new(input, output, synth).run(&mut ctx, None).await.unwrap();

    assert_eq!(manifest.written().len(), 1);
    assert_eq!(manifest.skipped().len(), 1);
    // 10 true, budget 30, only 20 available
    assert_eq!(manifest.written()[0].1.edges, 30);

    tokio::fs::remove_dir_all(&root).await.unwrap();
}
