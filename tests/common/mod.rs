#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bookshelf_app::Gateway;
use bookshelf_db::{KeyValueStore, MemoryStore, StoreError, StoreResult};
use bookshelf_kernel::settings::Settings;
use serde_json::Value;
use tokio::sync::Barrier;

pub const API_KEY: &str = "test-key";

pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.api_key = Some(API_KEY.to_string());
    settings
}

pub fn gateway(backend: Arc<dyn KeyValueStore>) -> Gateway {
    Gateway::from_settings(backend, &settings())
}

/// Memory store whose operations can be made to fail per table.
pub struct FaultyStore {
    inner: MemoryStore,
    down: AtomicBool,
    failing_scans: Mutex<HashSet<String>>,
    failing_gets: Mutex<HashSet<String>>,
    /// Remaining successful puts; negative means unlimited
    puts_left: AtomicI64,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            down: AtomicBool::new(false),
            failing_scans: Mutex::new(HashSet::new()),
            failing_gets: Mutex::new(HashSet::new()),
            puts_left: AtomicI64::new(-1),
        }
    }

    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    pub fn fail_scans_of(&self, table: &str) {
        self.failing_scans.lock().unwrap().insert(table.to_string());
    }

    pub fn fail_gets_of(&self, table: &str) {
        self.failing_gets.lock().unwrap().insert(table.to_string());
    }

    pub fn allow_puts(&self, count: i64) {
        self.puts_left.store(count, Ordering::SeqCst);
    }

    pub async fn count(&self, table: &str) -> usize {
        self.inner.count(table).await
    }

    fn check(&self) -> StoreResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FaultyStore {
    async fn get(&self, table: &str, id: &str) -> StoreResult<Option<Value>> {
        self.check()?;
        if self.failing_gets.lock().unwrap().contains(table) {
            return Err(StoreError::unavailable("get timed out"));
        }
        self.inner.get(table, id).await
    }

    async fn put(&self, table: &str, id: &str, document: Value) -> StoreResult<()> {
        self.check()?;
        let left = self.puts_left.load(Ordering::SeqCst);
        if left == 0 {
            return Err(StoreError::unavailable("throughput exceeded"));
        }
        if left > 0 {
            self.puts_left.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.put(table, id, document).await
    }

    async fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
        self.check()?;
        self.inner.delete(table, id).await
    }

    async fn scan(&self, table: &str) -> StoreResult<Vec<Value>> {
        self.check()?;
        if self.failing_scans.lock().unwrap().contains(table) {
            return Err(StoreError::unavailable("scan timed out"));
        }
        self.inner.scan(table).await
    }
}

/// Holds the first `parties` scans at a barrier after they have read, so that concurrent
/// check-then-act sequences all see the same snapshot before any of them writes.
pub struct GatedStore {
    inner: MemoryStore,
    armed: AtomicBool,
    barrier: Barrier,
}

impl GatedStore {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            armed: AtomicBool::new(true),
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, table: &str, id: &str) -> StoreResult<Option<Value>> {
        self.inner.get(table, id).await
    }

    async fn put(&self, table: &str, id: &str, document: Value) -> StoreResult<()> {
        self.inner.put(table, id, document).await
    }

    async fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
        self.inner.delete(table, id).await
    }

    async fn scan(&self, table: &str) -> StoreResult<Vec<Value>> {
        let snapshot = self.inner.scan(table).await;
        if self.armed.load(Ordering::SeqCst) && self.barrier.wait().await.is_leader() {
            self.armed.store(false, Ordering::SeqCst);
        }
        snapshot
    }
}
