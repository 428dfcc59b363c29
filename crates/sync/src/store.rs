//! Dual-mode resource store.
//!
//! One store instance governs one entity collection (cart or wishlist) for
//! the current owner. The authoritative view depends on authentication
//! state:
//!
//! - **Anonymous**: the locally persisted collection. Mutations apply
//!   synchronously and write through immediately.
//! - **Authenticated**: the optimistic overlay applied to the latest remote
//!   snapshot. Mutations apply to the overlay synchronously and enqueue a
//!   fire-and-forget remote call; call failures are logged and swallowed so
//!   the UI never regresses mid-session.
//!
//! Mutations never block on the network. A fresh snapshot (via [`DualModeStore::refresh`])
//! replaces the snapshot and clears the overlay, bounding any drift window
//! to "until the next refresh".

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::warn;

use driftwood_core::ResourceId;

use crate::model::{Cart, CartLine, LineKey, ResourceCollection, Wishlist};
use crate::overlay::Overlay;
use crate::remote::{RemoteCollectionService, RemoteError};
use crate::session::OwnerIdentity;
use crate::storage::{KeyValueStore, ScopedStore};

/// Dual-mode store instantiated for the cart.
pub type CartStore<R> = DualModeStore<Cart, R>;
/// Dual-mode store instantiated for the wishlist.
pub type WishlistStore<R> = DualModeStore<Wishlist, R>;

struct State<C: ResourceCollection> {
    identity: OwnerIdentity,
    /// Anonymous-mode working copy, mirrored to local storage.
    local: C,
    /// Latest fetched remote snapshot (authenticated mode).
    snapshot: C,
    /// Mutations not yet reflected in `snapshot`.
    overlay: Overlay<C>,
}

/// A store over one entity collection that swaps its source of truth with
/// authentication state.
pub struct DualModeStore<C: ResourceCollection, R: RemoteCollectionService> {
    entity: &'static str,
    storage: ScopedStore<C>,
    remote: Arc<R>,
    state: Mutex<State<C>>,
}

impl<C: ResourceCollection, R: RemoteCollectionService> DualModeStore<C, R> {
    /// Create a store in anonymous mode, loading whatever the anonymous
    /// scope last persisted.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>, remote: Arc<R>, entity: &'static str) -> Self {
        let storage = ScopedStore::new(backend, entity);
        let local = storage.read(&OwnerIdentity::Anonymous);

        Self {
            entity,
            storage,
            remote,
            state: Mutex::new(State {
                identity: OwnerIdentity::Anonymous,
                local,
                snapshot: C::default(),
                overlay: Overlay::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &State<C>) {
        self.storage.write(&state.identity, &state.local);
    }

    /// Run a remote mutation in the background. Failures are logged and
    /// swallowed; the optimistic state is never rolled back (the next
    /// refresh converges the view).
    fn spawn_remote<F>(&self, op: &'static str, fut: F)
    where
        F: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        let entity = self.entity;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = fut.await {
                        warn!(
                            entity,
                            op,
                            error = %e,
                            "background remote mutation failed; keeping optimistic state"
                        );
                    }
                });
            }
            Err(_) => warn!(entity, op, "no async runtime; remote mutation not sent"),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The authoritative collection for the current mode. Recomputed on
    /// every call, never cached.
    #[must_use]
    pub fn collection(&self) -> C {
        let state = self.lock();
        if state.identity.is_authenticated() {
            state.overlay.apply(&state.snapshot)
        } else {
            state.local.clone()
        }
    }

    /// All entries of the authoritative collection.
    #[must_use]
    pub fn items(&self) -> Vec<C::Item> {
        self.collection().items()
    }

    /// Whether an entry with `key` is present.
    #[must_use]
    pub fn contains(&self, key: &C::Key) -> bool {
        self.collection().contains(key)
    }

    /// UI-facing count (summed quantities for carts, entry count for sets).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.collection().unit_count()
    }

    /// Current owner identity.
    #[must_use]
    pub fn identity(&self) -> OwnerIdentity {
        self.lock().identity.clone()
    }

    // =========================================================================
    // Mutations (synchronous; never block on network)
    // =========================================================================

    /// Merge-add an item. Same-key entries combine per the collection's
    /// merge semantics.
    pub fn add(&self, item: C::Item) {
        let key = C::key_of(&item);
        let mut state = self.lock();

        if state.identity.is_authenticated() {
            let mut effective = state.overlay.apply(&state.snapshot);
            let existed = effective.contains(&key);
            effective.add(item);
            let Some(merged) = effective.get(&key).cloned() else {
                return;
            };

            let quantity = C::remote_quantity(&merged);
            state.overlay.record_upsert(merged);
            drop(state);

            let (id, variant) = C::remote_key(&key);
            let remote = Arc::clone(&self.remote);
            if existed {
                // The caller computed the merged quantity from the
                // already-updated view, so the wire carries an absolute
                // target and out-of-order completion is tolerable.
                self.spawn_remote("update", async move {
                    remote.update(&id, variant.as_deref(), quantity).await
                });
            } else {
                self.spawn_remote("add", async move {
                    remote.add(&id, variant.as_deref(), quantity).await
                });
            }
        } else {
            state.local.add(item);
            self.persist(&state);
        }
    }

    /// Insert-or-replace an item (no merging).
    pub fn set(&self, item: C::Item) {
        let key = C::key_of(&item);
        let mut state = self.lock();

        if state.identity.is_authenticated() {
            let existed = state.overlay.apply(&state.snapshot).contains(&key);
            let quantity = C::remote_quantity(&item);
            state.overlay.record_upsert(item);
            drop(state);

            let (id, variant) = C::remote_key(&key);
            let remote = Arc::clone(&self.remote);
            if existed {
                self.spawn_remote("update", async move {
                    remote.update(&id, variant.as_deref(), quantity).await
                });
            } else {
                self.spawn_remote("add", async move {
                    remote.add(&id, variant.as_deref(), quantity).await
                });
            }
        } else {
            state.local.set(item);
            self.persist(&state);
        }
    }

    /// Remove the entry with `key`. Removing an absent entry is a no-op,
    /// not an error.
    pub fn remove(&self, key: &C::Key) {
        let mut state = self.lock();

        if state.identity.is_authenticated() {
            state.overlay.record_remove(key.clone());
            drop(state);

            let (id, variant) = C::remote_key(key);
            let remote = Arc::clone(&self.remote);
            self.spawn_remote("remove", async move {
                remote.remove(&id, variant.as_deref()).await
            });
        } else if state.local.remove(key) {
            self.persist(&state);
        }
    }

    /// Empty the collection. In authenticated mode this issues one remote
    /// remove per current entry; no bulk-clear endpoint is assumed.
    pub fn clear(&self) {
        let mut state = self.lock();

        if state.identity.is_authenticated() {
            let effective = state.overlay.apply(&state.snapshot);
            let keys: Vec<C::Key> = effective.items().iter().map(C::key_of).collect();
            for key in &keys {
                state.overlay.record_remove(key.clone());
            }
            drop(state);

            for key in keys {
                let (id, variant) = C::remote_key(&key);
                let remote = Arc::clone(&self.remote);
                self.spawn_remote("remove", async move {
                    remote.remove(&id, variant.as_deref()).await
                });
            }
        } else {
            state.local = C::default();
            self.persist(&state);
        }
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Fetch a fresh remote snapshot, replace the cached one, and clear the
    /// overlay. Anonymous mode has no remote source and returns `Ok` without
    /// touching the network.
    ///
    /// # Errors
    ///
    /// Returns the remote error on fetch failure; the store keeps its
    /// current (possibly empty) snapshot and the overlay is left intact.
    pub async fn refresh(&self) -> Result<(), RemoteError> {
        if !self.identity().is_authenticated() {
            return Ok(());
        }

        let items = self.remote.list().await?;

        let mut state = self.lock();
        // A logout can land while the fetch is in flight; a stale snapshot
        // must not leak into anonymous mode.
        if state.identity.is_authenticated() {
            state.snapshot = C::from_snapshot(items);
            state.overlay.clear();
        }
        Ok(())
    }

    /// Re-read the anonymous collection from storage. Hook for the backing
    /// store's cross-tab change notification; last writer wins. No-op in
    /// authenticated mode.
    pub fn reload_from_storage(&self) {
        let mut state = self.lock();
        if !state.identity.is_authenticated() {
            state.local = self.storage.read(&state.identity);
        }
    }

    /// Re-point the store at a new owner.
    ///
    /// Discards the overlay and snapshot. Entering anonymous mode re-reads
    /// whatever the anonymous scope last persisted (a pre-login cart stays
    /// dormant through the authenticated session and resurfaces here).
    /// Entering authenticated mode starts empty until [`Self::refresh`]
    /// succeeds; it never falls back to anonymous data.
    ///
    /// Normally driven by [`crate::SyncContext`], which also triggers the
    /// post-login refresh.
    pub fn set_identity(&self, identity: OwnerIdentity) {
        let mut state = self.lock();
        state.overlay.clear();
        state.snapshot = C::default();
        state.identity = identity;
        state.local = if state.identity.is_authenticated() {
            C::default()
        } else {
            self.storage.read(&state.identity)
        };
    }
}

// =============================================================================
// Cart-specific operations
// =============================================================================

impl<R: RemoteCollectionService> DualModeStore<Cart, R> {
    /// Set the absolute quantity of an existing line. Quantity below 1 is
    /// defined as removal; updating an absent line is a no-op.
    pub fn update_quantity(&self, key: &LineKey, quantity: u32) {
        if quantity < 1 {
            self.remove(key);
            return;
        }

        let current = self.collection().get(key).cloned();
        if let Some(mut line) = current {
            line.quantity = quantity;
            self.set(line);
        }
    }

    /// Sum of `unit_price * quantity` over the authoritative lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.collection().total()
    }

    /// Authoritative cart lines in collection order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.items()
    }
}

// =============================================================================
// Wishlist-specific operations
// =============================================================================

impl<R: RemoteCollectionService> DualModeStore<Wishlist, R> {
    /// Flip membership of `id`; returns whether it is present afterwards.
    pub fn toggle(&self, id: ResourceId) -> bool {
        if self.contains(&id) {
            self.remove(&id);
            false
        } else {
            self.add(id);
            true
        }
    }
}
