use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{KeyValueStore, StoreResult};

type Table = HashMap<String, Value>;

/// In-process backend. Tables are created on first write.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `table`.
    pub async fn count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, table: &str, id: &str) -> StoreResult<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|docs| docs.get(id)).cloned())
    }

    async fn put(&self, table: &str, id: &str, document: Value) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(docs) = tables.get_mut(table) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn scan(&self, table: &str) -> StoreResult<Vec<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}
