//! In-memory graph store.
//!
//! Items are held as serialized JSON bytes so that loading exercises the
//! same decode path as a persistent store, and so tests can plant
//! undecodable items with [`MemoryGraphStore::insert_raw`].
//!
//! Cloning is cheap and clones share the same contents.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{check_id, GraphStore};
use crate::model::EventGraph;
use crate::{Error, Result};

// ============================================================================
// MemoryGraphStore
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryGraphStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    items: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under `id` without validating them.
    pub fn insert_raw(&self, id: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.inner.items.write().insert(id.into(), bytes.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.items.read().contains_key(id)
    }
}

impl std::fmt::Debug for MemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGraphStore")
            .field("items", &self.inner.items.read().len())
            .finish()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.inner.items.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn load(&self, id: &str) -> Result<EventGraph> {
        check_id(id)?;
        let items = self.inner.items.read();
        let bytes = items.get(id).ok_or_else(|| Error::NotFound(format!("event graph {id}")))?;
        Ok(serde_json::from_slice(bytes)?)
    }

    async fn save(&self, id: &str, graph: &EventGraph) -> Result<()> {
        check_id(id)?;
        let bytes = serde_json::to_vec(graph)?;
        self.inner.items.write().insert(id.to_string(), bytes);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.items.read().len())
    }
}

// ============================================================================
// Tests
// ============================================================================
