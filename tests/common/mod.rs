// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use carbon_tracker::config::Config;
use carbon_tracker::db::{KeyValueStore, MemoryStore, StoreError};
use carbon_tracker::routes::create_router;
use carbon_tracker::services::Ledger;
use carbon_tracker::AppState;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Load a ledger over the given in-memory store.
#[allow(dead_code)]
pub async fn test_ledger(store: &MemoryStore) -> Arc<Ledger> {
    Arc::new(Ledger::load(Arc::new(store.clone())).await)
}

/// Create a test app over an in-memory store.
/// Returns the router, the shared state and the backing store.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryStore) {
    let store = MemoryStore::new();
    let ledger = test_ledger(&store).await;
    let state = Arc::new(AppState::new(Config::test_default(), ledger));

    (create_router(state.clone()), state, store)
}

/// Store wrapper that can be told to fail reads or writes.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_writes: Arc<AtomicBool>,
    pub failing_reads: Arc<Mutex<HashSet<String>>>,
    pub writes: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads_for(&self, key: &str) {
        self.failing_reads.lock().unwrap().insert(key.to_string());
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.failing_reads.lock().unwrap().contains(key) {
            return Err(StoreError::Unavailable(format!("read of {} refused", key)));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of {} refused", key)));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}
