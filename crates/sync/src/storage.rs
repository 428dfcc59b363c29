//! Scoped persistence over a synchronous key-value store.
//!
//! The engine treats local storage as a dumb string map: whole collections
//! are serialized to JSON under a key derived from the entity and the
//! current owner scope. Volumes are tens of items, so whole-blob overwrites
//! beat partial patches on simplicity.
//!
//! Corruption is never fatal: a missing or unparseable blob reads as an
//! empty collection and the next write heals it.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::session::OwnerIdentity;

/// Key prefix shared by all engine storage keys.
const NAMESPACE: &str = "driftwood";

/// A synchronous persistent string map.
///
/// `set` and `remove` have no failure channel: backends log and swallow
/// write errors, matching the self-healing contract above.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// Backends
// =============================================================================

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// File-backed store: one JSON object per file, rewritten on every mutation.
///
/// This is the "persistent local storage" of an anonymous visitor in a
/// headless client. An unreadable or unparseable file loads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::debug!(path = %path.display(), error = %e, "store file unparseable, starting empty");
                HashMap::new()
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "store file unreadable, starting empty");
                HashMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string(entries) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to write store file");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize store contents");
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.lock();
        entries.remove(key);
        self.flush(&entries);
    }
}

// =============================================================================
// Scoped adapter
// =============================================================================

/// Reads and writes one entity's collection under owner-derived keys.
///
/// The key is `driftwood:{entity}:{scope}`, where scope is `anon` or
/// `user:{key}`. Re-pointing at a different owner is just reading under a
/// different scope; dormant collections stay untouched under their own keys.
pub struct ScopedStore<C> {
    backend: Arc<dyn KeyValueStore>,
    entity: &'static str,
    _collection: PhantomData<fn() -> C>,
}

impl<C> ScopedStore<C>
where
    C: Serialize + DeserializeOwned + Default,
{
    /// Create an adapter for one entity.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>, entity: &'static str) -> Self {
        Self {
            backend,
            entity,
            _collection: PhantomData,
        }
    }

    /// Storage key for a scope.
    #[must_use]
    pub fn storage_key(&self, scope: &OwnerIdentity) -> String {
        format!("{NAMESPACE}:{}:{}", self.entity, scope.scope_key())
    }

    /// Read the collection stored for `scope`. Absent or corrupt blobs read
    /// as `C::default()`.
    #[must_use]
    pub fn read(&self, scope: &OwnerIdentity) -> C {
        let key = self.storage_key(scope);
        match self.backend.get(&key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::debug!(key = %key, error = %e, "stored collection unparseable, treating as empty");
                C::default()
            }),
            None => C::default(),
        }
    }

    /// Overwrite the collection stored for `scope`.
    pub fn write(&self, scope: &OwnerIdentity, collection: &C) {
        let key = self.storage_key(scope);
        match serde_json::to_string(collection) {
            Ok(raw) => self.backend.set(&key, &raw),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to serialize collection");
            }
        }
    }
}
