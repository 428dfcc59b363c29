//! Optimistic overlay: mutations issued but not yet reflected in a remote
//! snapshot.
//!
//! Authenticated-mode mutations update the UI immediately and enqueue a
//! background remote call. The overlay bridges the latency window: the
//! effective collection is the last fetched snapshot with every pending
//! mutation applied on top. When a fresh snapshot arrives the whole overlay
//! is cleared rather than confirming ops one by one - a small staleness
//! window traded for never growing unbounded.

use std::collections::HashMap;

use crate::model::ResourceCollection;

/// A mutation awaiting remote confirmation.
#[derive(Debug, Clone)]
enum Pending<T> {
    /// Item added or rewritten locally; carries the full local value so the
    /// effective view can show it before the remote echoes it back.
    Upsert(T),
    /// Item removed locally.
    Remove,
}

/// Pending mutations for one collection, keyed by entry identity.
///
/// Recording an upsert for a key drops any pending remove for that key and
/// vice versa, so the net effect of any op sequence on one key is its last
/// operation.
#[derive(Debug)]
pub struct Overlay<C: ResourceCollection> {
    pending: HashMap<C::Key, Pending<C::Item>>,
}

impl<C: ResourceCollection> Default for Overlay<C> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<C: ResourceCollection> Overlay<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local add/update of `item`.
    pub fn record_upsert(&mut self, item: C::Item) {
        self.pending.insert(C::key_of(&item), Pending::Upsert(item));
    }

    /// Record a local removal of the entry with `key`.
    pub fn record_remove(&mut self, key: C::Key) {
        self.pending.insert(key, Pending::Remove);
    }

    /// Compute the effective collection: the snapshot with pending upserts
    /// included and pending removals excluded.
    #[must_use]
    pub fn apply(&self, snapshot: &C) -> C {
        let mut effective = snapshot.clone();
        for (key, op) in &self.pending {
            match op {
                Pending::Upsert(item) => effective.set(item.clone()),
                Pending::Remove => {
                    effective.remove(key);
                }
            }
        }
        effective
    }

    /// Drop every pending entry. Called whenever a fresh snapshot arrives
    /// and on session transitions.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
