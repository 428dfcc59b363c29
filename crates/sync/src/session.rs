//! Owner identity and session transitions.
//!
//! [`SyncContext`] is the explicit context object constructed once per
//! application root and handed to view code by reference - there are no
//! module-level singletons. It owns one store per entity and reacts to the
//! owner-identity signal: on login/logout it discards overlays, re-points
//! every store's persistence scope, and triggers fresh remote fetches when
//! entering authenticated mode.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::address_book::AddressBook;
use crate::config::SyncConfig;
use crate::order_history::OrderHistory;
use crate::remote::{HttpRemoteService, RemoteCollectionService};
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::store::{CartStore, WishlistStore};

/// The identity that owns the currently authoritative collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerIdentity {
    /// Stable anonymous browser scope; state lives in local storage.
    Anonymous,
    /// Authenticated user, identified by a stable user key; state is
    /// sourced from the remote resource service.
    User(String),
}

impl OwnerIdentity {
    /// Construct an authenticated identity.
    pub fn user(key: impl Into<String>) -> Self {
        Self::User(key.into())
    }

    /// Whether this identity is an authenticated user.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Storage scope segment: `anon`, or `user:{key}`.
    #[must_use]
    pub fn scope_key(&self) -> String {
        match self {
            Self::Anonymous => "anon".to_string(),
            Self::User(key) => format!("user:{key}"),
        }
    }
}

/// Per-application-root handle to every entity store.
pub struct SyncContext<R: RemoteCollectionService> {
    identity: Mutex<OwnerIdentity>,
    cart: CartStore<R>,
    wishlist: WishlistStore<R>,
    addresses: AddressBook,
    orders: OrderHistory,
}

impl SyncContext<HttpRemoteService> {
    /// Build a context from configuration: file-backed local storage and
    /// HTTP remote services for the cart and wishlist collections.
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        let backend: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&config.storage_path));
        let cart_remote = Arc::new(HttpRemoteService::new(&config.remote, "cart"));
        let wishlist_remote = Arc::new(HttpRemoteService::new(&config.remote, "wishlist"));
        Self::new(backend, cart_remote, wishlist_remote)
    }
}

impl<R: RemoteCollectionService> SyncContext<R> {
    /// Build a context over an explicit storage backend and remote
    /// services. Starts in anonymous mode.
    #[must_use]
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        cart_remote: Arc<R>,
        wishlist_remote: Arc<R>,
    ) -> Self {
        Self {
            identity: Mutex::new(OwnerIdentity::Anonymous),
            cart: CartStore::new(Arc::clone(&backend), cart_remote, "cart"),
            wishlist: WishlistStore::new(Arc::clone(&backend), wishlist_remote, "wishlist"),
            addresses: AddressBook::new(Arc::clone(&backend)),
            orders: OrderHistory::new(backend),
        }
    }

    fn lock_identity(&self) -> MutexGuard<'_, OwnerIdentity> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current owner identity.
    #[must_use]
    pub fn identity(&self) -> OwnerIdentity {
        self.lock_identity().clone()
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<R> {
        &self.cart
    }

    /// The wishlist store.
    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore<R> {
        &self.wishlist
    }

    /// The owner's saved addresses.
    #[must_use]
    pub const fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// The owner's order history.
    #[must_use]
    pub const fn orders(&self) -> &OrderHistory {
        &self.orders
    }

    fn apply_identity(&self, identity: OwnerIdentity) {
        *self.lock_identity() = identity.clone();
        self.cart.set_identity(identity.clone());
        self.wishlist.set_identity(identity.clone());
        self.addresses.set_identity(identity.clone());
        self.orders.set_identity(identity);
    }

    /// Switch to an authenticated user and fetch fresh remote snapshots.
    ///
    /// The anonymous collections stay dormant under their own scope keys;
    /// they are not merged into the user's remote collections. A failed
    /// fetch leaves the affected store empty (never stale anonymous data)
    /// until a later [`crate::DualModeStore::refresh`] succeeds.
    #[instrument(skip(self))]
    pub async fn login(&self, user_key: &str) {
        info!(user_key, "session transition: login");
        self.apply_identity(OwnerIdentity::user(user_key));

        let (cart, wishlist) = tokio::join!(self.cart.refresh(), self.wishlist.refresh());
        if let Err(e) = cart {
            warn!(error = %e, "cart fetch failed after login; cart stays empty until refresh");
        }
        if let Err(e) = wishlist {
            warn!(error = %e, "wishlist fetch failed after login; wishlist stays empty until refresh");
        }
    }

    /// Switch back to the anonymous owner, re-reading whatever the
    /// anonymous scope last persisted.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        info!("session transition: logout");
        self.apply_identity(OwnerIdentity::Anonymous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_keys() {
        assert_eq!(OwnerIdentity::Anonymous.scope_key(), "anon");
        assert_eq!(OwnerIdentity::user("u-42").scope_key(), "user:u-42");
    }

    #[test]
    fn test_is_authenticated() {
        assert!(!OwnerIdentity::Anonymous.is_authenticated());
        assert!(OwnerIdentity::user("u").is_authenticated());
    }

    #[test]
    fn test_distinct_users_get_distinct_scopes() {
        assert_ne!(
            OwnerIdentity::user("a").scope_key(),
            OwnerIdentity::user("b").scope_key()
        );
    }
}
