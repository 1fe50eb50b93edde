//! # Graph Store Trait
//!
//! The contract between the pipeline and wherever event graphs live.
//! Items are addressed by a string id and stored as serialized
//! `EventGraph` documents.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryGraphStore` | `memory` | In-memory, for tests and embedding |
//! | `DirectoryGraphStore` | `directory` | One `<id>.json` file per event (feature `fs`) |

pub mod memory;
#[cfg(feature = "fs")]
pub mod directory;

use async_trait::async_trait;

use crate::model::EventGraph;
use crate::{Error, Result};

pub use memory::MemoryGraphStore;
#[cfg(feature = "fs")]
pub use directory::DirectoryGraphStore;

// ============================================================================
// Store configuration
// ============================================================================

/// Where a collection lives.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// In-memory (no persistence)
    Memory,

    /// A directory of JSON documents
    #[cfg(feature = "fs")]
    Directory { path: std::path::PathBuf },
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Keyed collection of event graphs.
///
/// `load` fails with `Error::NotFound` for an unknown id and with
/// `Error::Serialization` when the stored bytes are not a valid graph;
/// bulk loaders treat the latter as a skippable item.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    /// All ids in the store, ascending.
    async fn list(&self) -> Result<Vec<String>>;

    async fn load(&self, id: &str) -> Result<EventGraph>;

    /// Insert or replace.
    async fn save(&self, id: &str, graph: &EventGraph) -> Result<()>;

    /// Number of stored items.
    async fn count(&self) -> Result<usize> {
        Ok(self.list().await?.len())
    }
}

#[async_trait]
impl<T: GraphStore + ?Sized> GraphStore for Box<T> {
    async fn list(&self) -> Result<Vec<String>> {
        (**self).list().await
    }

    async fn load(&self, id: &str) -> Result<EventGraph> {
        (**self).load(id).await
    }

    async fn save(&self, id: &str, graph: &EventGraph) -> Result<()> {
        (**self).save(id, graph).await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}

/// Open the store `config` describes.
pub async fn open_store(config: &StoreConfig) -> Result<Box<dyn GraphStore>> {
    match config {
        StoreConfig::Memory => Ok(Box::new(MemoryGraphStore::new())),
        #[cfg(feature = "fs")]
        StoreConfig::Directory { path } => Ok(Box::new(DirectoryGraphStore::open(path.clone()).await?)),
    }
}

/// Ids become file names in some stores; keep them to one path segment.
pub(crate) fn check_id(id: &str) -> Result<()> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(Error::Storage(format!("invalid item id {id:?}")));
    }
    Ok(())
}
