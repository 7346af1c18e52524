//! In-memory entry store.
//!
//! # Responsibilities
//! - Hold the authoritative name → entry map
//! - Hand out consistent snapshots to readers
//!
//! # Design Decisions
//! - The map is an immutable `BTreeMap` behind `ArcSwap`: readers load the
//!   current `Arc` and never block, writers publish a modified copy
//! - `BTreeMap` keeps entries sorted by name, which is the render order
//! - Writers are serialized by the caller (the manager's pipeline lock);
//!   the store itself does not guard against lost updates

use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::managed::entry::ManagedEntry;

/// Snapshot type handed out to readers.
pub type Snapshot<E> = Arc<BTreeMap<String, E>>;

pub struct EntryStore<E> {
    inner: ArcSwap<BTreeMap<String, E>>,
}

impl<E: ManagedEntry> EntryStore<E> {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(BTreeMap::new()),
        }
    }

    /// Build a store from loaded entries. Later duplicates win.
    pub fn from_entries(entries: impl IntoIterator<Item = E>) -> Self {
        let map: BTreeMap<String, E> = entries
            .into_iter()
            .map(|e| (e.name().to_string(), e))
            .collect();
        Self {
            inner: ArcSwap::from_pointee(map),
        }
    }

    pub fn snapshot(&self) -> Snapshot<E> {
        self.inner.load_full()
    }

    /// All entries, sorted by name.
    pub fn list(&self) -> Vec<E> {
        self.inner.load().values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<E> {
        self.inner.load().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or overwrite. Returns the previous entry under that name.
    pub fn upsert(&self, entry: E) -> Option<E> {
        let mut next = BTreeMap::clone(&self.inner.load());
        let previous = next.insert(entry.name().to_string(), entry);
        self.inner.store(Arc::new(next));
        previous
    }

    pub fn remove(&self, name: &str) -> Option<E> {
        let current = self.inner.load();
        if !current.contains_key(name) {
            return None;
        }
        let mut next = BTreeMap::clone(&current);
        let removed = next.remove(name);
        self.inner.store(Arc::new(next));
        removed
    }
}

impl<E: ManagedEntry> Default for EntryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}
