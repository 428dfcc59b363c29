//! Entity collections governed by the synchronization engine.
//!
//! The mutate/persist/reconcile glue is identical across entities, so it
//! lives behind one [`ResourceCollection`] abstraction that the dual-mode
//! store is generic over. [`cart::Cart`] carries the quantity-merge
//! semantics, [`wishlist::Wishlist`] the set semantics; addresses and
//! orders are simpler single-mode collections with their own modules.

pub mod address;
pub mod cart;
pub mod order;
pub mod wishlist;

pub use address::{NewAddress, SavedAddress};
pub use cart::{Cart, CartLine, LineKey};
pub use order::{Order, TrackingEvent};
pub use wishlist::Wishlist;

use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

use driftwood_core::ResourceId;

use crate::remote::RemoteItem;

/// A keyed entity collection the dual-mode store can govern.
///
/// Implementations define what "add" merges (cart sums quantities, wishlist
/// is a set-insert) and how the collection maps to the remote resource
/// service's wire items. All operations are pure in-memory mutations; the
/// store decides when to persist or enqueue remote calls.
pub trait ResourceCollection:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// One entry in the collection.
    type Item: Clone + Send + Sync + 'static;
    /// Identity of an entry. Two entries with equal keys are the same
    /// logical entry.
    type Key: Clone + Eq + Hash + Send + Sync + 'static;

    /// Identity of an item.
    fn key_of(item: &Self::Item) -> Self::Key;

    /// Merge-insert: same-key entries combine (sum quantities / no-op),
    /// new keys append.
    fn add(&mut self, item: Self::Item);

    /// Absolute insert-or-replace: any existing same-key entry is
    /// overwritten, never merged.
    fn set(&mut self, item: Self::Item);

    /// Remove the entry with this key. Removing an absent key is a no-op;
    /// returns whether an entry was removed.
    fn remove(&mut self, key: &Self::Key) -> bool;

    /// Look up an entry by key.
    fn get(&self, key: &Self::Key) -> Option<&Self::Item>;

    /// All entries, in collection order.
    fn items(&self) -> Vec<Self::Item>;

    /// Number of entries.
    fn len(&self) -> usize;

    /// UI-facing count: summed quantities for carts, entry count for sets.
    fn unit_count(&self) -> u32;

    /// Build the collection from a fresh remote snapshot.
    fn from_snapshot(items: Vec<RemoteItem>) -> Self;

    /// Remote identity of a key: the normalized resource id plus the
    /// variant selector, where the entity has one.
    fn remote_key(key: &Self::Key) -> (ResourceId, Option<String>);

    /// Absolute quantity the remote should hold for this entry.
    fn remote_quantity(item: &Self::Item) -> u32;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }
}
