//! # Per-Client Value Storage
//!
//! In-memory state the server maintains on behalf of its clients: one
//! [`OrderedValueSet`] per client ID, held in a [`ClientStore`] behind a
//! single reader/writer lock.
//!
//! The store lives for the process lifetime. Sets are created lazily on a
//! client's first successful add and are never destroyed.

use indexmap::IndexSet;
use std::collections::HashMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Container of unique values preserving first-insertion order.
///
/// Membership tests, inserts and deletes are O(1)-class; enumeration yields
/// values in the order they were first inserted, and that order is stable
/// across deletions of other values.
#[derive(Debug, Default)]
pub struct OrderedValueSet {
    values: IndexSet<String>,
}

impl OrderedValueSet {
    /// Insert a value. Returns `false` if the value was already present, in
    /// which case contents and order are left untouched.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.values.insert(value.into())
    }

    /// Delete a value. Returns `false` if the value was absent.
    ///
    /// Uses `shift_remove` so the remaining values keep their insertion
    /// order; `swap_remove` would be faster but scrambles it.
    pub fn remove(&mut self, value: &str) -> bool {
        self.values.shift_remove(value)
    }

    /// Whether the value is present.
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// The values in insertion order. The iterator is finite and can be
    /// re-created at will; it borrows the set, so callers hold whatever lock
    /// they used to reach it.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Concurrency-safe mapping from client ID to its [`OrderedValueSet`].
///
/// One coarse reader/writer lock protects the entire mapping. That keeps the
/// locking story trivial at the cost of serializing writes for unrelated
/// clients; sharding the map would lift that limit if write pressure ever
/// demands it.
///
/// The store is an ordinary value meant to be constructed explicitly and
/// injected (wrapped in an `Arc`) into whatever owns it, so tests can run
/// against fresh instances.
#[derive(Debug, Default)]
pub struct ClientStore {
    clients: RwLock<HashMap<Uuid, OrderedValueSet>>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access for read-only operations.
    pub async fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, OrderedValueSet>> {
        self.clients.read().await
    }

    /// Exclusive access for mutating operations.
    pub async fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, OrderedValueSet>> {
        self.clients.write().await
    }

    /// Materialized view of one client's values in insertion order. A client
    /// with no set reads as empty.
    pub async fn snapshot(&self, client_id: Uuid) -> Vec<String> {
        self.clients
            .read()
            .await
            .get(&client_id)
            .map(|set| set.iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
