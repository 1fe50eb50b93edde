//! Directory-backed graph store: one `<id>.json` document per event.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{check_id, GraphStore};
use crate::model::EventGraph;
use crate::{Error, Result};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct DirectoryGraphStore {
    root: PathBuf,
}

impl DirectoryGraphStore {
    /// Open `root`, creating it if missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{EXTENSION}"))
    }
}

#[async_trait]
impl GraphStore for DirectoryGraphStore {
    async fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn load(&self, id: &str) -> Result<EventGraph> {
        check_id(id)?;
        let bytes = match tokio::fs::read(self.path_of(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("event graph {id}")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, id: &str, graph: &EventGraph) -> Result<()> {
        check_id(id)?;
        let bytes = serde_json::to_vec(graph)?;
        // Replace atomically
        let tmp = self.root.join(format!(".{id}.{EXTENSION}.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, self.path_of(id)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
