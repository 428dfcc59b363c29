//! Wishlist synchronization scenarios.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use driftwood_core::ResourceId;
use driftwood_integration_tests::{MockRemote, remote_item, settle};
use driftwood_sync::{MemoryStore, OwnerIdentity, WishlistStore};

fn store() -> (WishlistStore<MockRemote>, Arc<MockRemote>) {
    let remote = Arc::new(MockRemote::new());
    let store = WishlistStore::new(Arc::new(MemoryStore::new()), Arc::clone(&remote), "wishlist");
    (store, remote)
}

#[tokio::test]
async fn test_anonymous_toggle_never_touches_remote() {
    let (store, remote) = store();

    let id = ResourceId::from(9);
    assert!(store.toggle(id.clone()));
    assert!(!store.toggle(id));

    settle().await;
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_authenticated_toggle_round_trips_to_remote() {
    let (store, remote) = store();
    store.set_identity(OwnerIdentity::user("u1"));

    let id = ResourceId::from("gid://product/9");
    assert!(store.toggle(id.clone()));
    settle().await;
    assert_eq!(remote.items().len(), 1);

    assert!(!store.toggle(id.clone()));
    settle().await;
    assert!(remote.items().is_empty());

    // View and server agree after a refresh.
    store.refresh().await.unwrap();
    assert!(!store.contains(&id));
}

#[tokio::test]
async fn test_numeric_and_string_ids_normalize() {
    let (store, remote) = store();
    remote.set_items(vec![remote_item(9, None, 1)]);
    store.set_identity(OwnerIdentity::user("u1"));
    store.refresh().await.unwrap();

    // The snapshot carried the id as a number; lookups with the string
    // form hit the same entry.
    assert!(store.contains(&ResourceId::from("9")));
    assert!(!store.toggle(ResourceId::from(9)));
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_wishlist_count_is_entry_count_not_quantity() {
    let (store, _remote) = store();

    store.add(ResourceId::from(1));
    store.add(ResourceId::from(1));
    store.add(ResourceId::from(2));

    // Adding a present entry is idempotent; count is set cardinality.
    assert_eq!(store.count(), 2);
}
