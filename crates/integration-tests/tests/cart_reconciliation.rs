//! Authenticated cart reconciliation scenarios.
//!
//! Covers the optimistic overlay against a scriptable remote: what the
//! wire carries, how the view converges on refresh, and how failed
//! mutations surface (they don't - the next refresh wins).

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use driftwood_integration_tests::{MockRemote, cart_line, remote_item, settle};
use driftwood_sync::{CartStore, LineKey, MemoryStore, OwnerIdentity};

async fn authenticated_store() -> (CartStore<MockRemote>, Arc<MockRemote>) {
    let remote = Arc::new(MockRemote::new());
    let store = CartStore::new(Arc::new(MemoryStore::new()), Arc::clone(&remote), "cart");
    store.set_identity(OwnerIdentity::user("u1"));
    store.refresh().await.unwrap();
    (store, remote)
}

#[tokio::test]
async fn test_add_propagates_to_remote() {
    let (store, remote) = authenticated_store().await;

    store.add(cart_line(7, Some("red"), 2));
    assert_eq!(store.count(), 2);

    settle().await;
    assert_eq!(remote.calls(), ["add 7 Some(\"red\") 2"]);
    assert_eq!(remote.items().len(), 1);

    // The view after a refresh equals the server truth.
    store.refresh().await.unwrap();
    assert_eq!(store.count(), 2);
}

#[tokio::test]
async fn test_merge_add_carries_absolute_target() {
    let (store, remote) = authenticated_store().await;
    remote.set_items(vec![remote_item(7, None, 2)]);
    store.refresh().await.unwrap();

    store.add(cart_line(7, None, 3));
    assert_eq!(store.count(), 5);

    settle().await;
    // Absolute target of 5, not a relative +3: replaying it is harmless.
    assert_eq!(remote.calls(), ["update 7 None 5"]);
    assert_eq!(remote.items()[0].quantity, 5);
}

#[tokio::test]
async fn test_update_quantity_zero_removes_remotely() {
    let (store, remote) = authenticated_store().await;
    remote.set_items(vec![remote_item(7, None, 2)]);
    store.refresh().await.unwrap();

    store.update_quantity(&LineKey::new(7, None), 0);
    assert_eq!(store.count(), 0);

    settle().await;
    assert_eq!(remote.calls(), ["remove 7 None"]);
    assert!(remote.items().is_empty());
}

#[tokio::test]
async fn test_clear_empties_remote_line_by_line() {
    let (store, remote) = authenticated_store().await;
    remote.set_items(vec![remote_item(1, None, 1), remote_item(2, None, 2)]);
    store.refresh().await.unwrap();

    store.clear();
    assert_eq!(store.count(), 0);

    settle().await;
    assert!(remote.items().is_empty());
}

#[tokio::test]
async fn test_failed_mutation_keeps_optimistic_view_until_refresh() {
    let (store, remote) = authenticated_store().await;

    remote.set_failing(true);
    store.add(cart_line(7, None, 1));
    settle().await;

    // No rollback: the line stays visible even though the wire call failed.
    assert_eq!(store.count(), 1);
    assert!(remote.items().is_empty());

    // The next successful refresh converges on the server truth.
    remote.set_failing(false);
    store.refresh().await.unwrap();
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_refresh_adopts_changes_from_another_device() {
    let (store, remote) = authenticated_store().await;
    remote.set_items(vec![remote_item(1, None, 1)]);
    store.refresh().await.unwrap();
    assert_eq!(store.count(), 1);

    // Another device rewrites the cart server-side.
    remote.set_items(vec![remote_item(2, None, 4), remote_item(3, Some("xl"), 1)]);
    store.refresh().await.unwrap();

    assert!(!store.contains(&LineKey::new(1, None)));
    assert!(store.contains(&LineKey::new(3, Some("xl"))));
    assert_eq!(store.count(), 5);
}

#[tokio::test]
async fn test_total_reflects_overlay() {
    let (store, _remote) = authenticated_store().await;

    // Lines are priced at $15.00 per unit.
    store.add(cart_line(1, None, 2));
    store.add(cart_line(2, None, 1));

    assert_eq!(store.total().to_string(), "45.00");
}
