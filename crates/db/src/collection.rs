use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{KeyValueStore, StoreError, StoreResult};

/// A record that can live in a [`Collection`].
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> &str;
}

/// Typed view over one table of a [`KeyValueStore`].
///
/// The table name is fixed at construction; nothing is read from the environment here.
pub struct Collection<D> {
    backend: Arc<dyn KeyValueStore>,
    table: String,
    _marker: PhantomData<fn() -> D>,
}

impl<D> Clone for Collection<D> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            table: self.table.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D: Document> Collection<D> {
    pub fn new(backend: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            _marker: PhantomData,
        }
    }

    /// Configured table name, for diagnostics.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<D>> {
        match self.backend.get(&self.table, id).await? {
            Some(raw) => self.decode(id, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Full overwrite, last writer wins.
    pub async fn put(&self, document: &D) -> StoreResult<()> {
        let raw = serde_json::to_value(document).map_err(|e| StoreError::Corrupt {
            table: self.table.clone(),
            id: document.id().to_string(),
            reason: e.to_string(),
        })?;
        self.backend.put(&self.table, document.id(), raw).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.backend.delete(&self.table, id).await
    }

    /// Every document in the table, unordered. Two scans may disagree.
    pub async fn scan_all(&self) -> StoreResult<Vec<D>> {
        let raw = self.backend.scan(&self.table).await?;
        tracing::trace!(table = %self.table, count = raw.len(), "scanned table");
        raw.into_iter()
            .map(|doc| {
                let id = doc
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<unknown>")
                    .to_string();
                self.decode(&id, doc)
            })
            .collect()
    }

    fn decode(&self, id: &str, raw: serde_json::Value) -> StoreResult<D> {
        serde_json::from_value(raw).map_err(|e| StoreError::Corrupt {
            table: self.table.clone(),
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}
