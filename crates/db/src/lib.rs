//! Entity store for the bookshelf service.
//!
//! The store is a capability, not a database: a backend only offers single-document
//! `get`/`put`/`delete` and a full-table `scan`. Every guarantee is per operation; no
//! sequence of calls is atomic.

pub mod collection;
pub mod error;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use collection::{Collection, Document};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// Backend capability set shared by every collection.
///
/// Documents are JSON objects keyed by id inside a named table. `put` overwrites,
/// `delete` of a missing id succeeds, and `scan` returns documents in no particular order.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, table: &str, id: &str) -> StoreResult<Option<Value>>;

    async fn put(&self, table: &str, id: &str, document: Value) -> StoreResult<()>;

    async fn delete(&self, table: &str, id: &str) -> StoreResult<()>;

    async fn scan(&self, table: &str) -> StoreResult<Vec<Value>>;
}
