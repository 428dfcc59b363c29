//! Wishlist collection with idempotent set semantics.

use serde::{Deserialize, Serialize};

use driftwood_core::ResourceId;

use super::ResourceCollection;
use crate::remote::RemoteItem;

/// A wishlist: an ordered set of resource ids.
///
/// No quantity, no variant. Adding a present id and removing an absent id
/// are both no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    entries: Vec<ResourceId>,
}

impl Wishlist {
    /// Borrow the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ResourceId] {
        &self.entries
    }
}

impl ResourceCollection for Wishlist {
    type Item = ResourceId;
    type Key = ResourceId;

    fn key_of(item: &Self::Item) -> Self::Key {
        item.clone()
    }

    fn add(&mut self, item: Self::Item) {
        if !self.entries.contains(&item) {
            self.entries.push(item);
        }
    }

    fn set(&mut self, item: Self::Item) {
        self.add(item);
    }

    fn remove(&mut self, key: &Self::Key) -> bool {
        match self.entries.iter().position(|entry| entry == key) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Item> {
        self.entries.iter().find(|entry| *entry == key)
    }

    fn items(&self) -> Vec<Self::Item> {
        self.entries.clone()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn unit_count(&self) -> u32 {
        u32::try_from(self.entries.len()).unwrap_or(u32::MAX)
    }

    fn from_snapshot(items: Vec<RemoteItem>) -> Self {
        let mut wishlist = Self::default();
        for item in items {
            wishlist.add(item.resource_id);
        }
        wishlist
    }

    fn remote_key(key: &Self::Key) -> (ResourceId, Option<String>) {
        (key.clone(), None)
    }

    fn remote_quantity(_item: &Self::Item) -> u32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::default();
        wishlist.add(ResourceId::from("abc"));
        wishlist.add(ResourceId::from("abc"));

        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut wishlist = Wishlist::default();
        wishlist.add(ResourceId::from(1));

        assert!(!wishlist.remove(&ResourceId::from(2)));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_presence_follows_last_operation() {
        let mut wishlist = Wishlist::default();
        let id = ResourceId::from(9);

        wishlist.add(id.clone());
        assert!(wishlist.contains(&id));

        wishlist.remove(&id);
        assert!(!wishlist.contains(&id));

        // Repeated same-direction operations do not flip presence.
        wishlist.add(id.clone());
        wishlist.add(id.clone());
        assert!(wishlist.contains(&id));
    }

    #[test]
    fn test_numeric_and_string_ids_are_one_entry() {
        let mut wishlist = Wishlist::default();
        wishlist.add(ResourceId::from(7));
        wishlist.add(ResourceId::from("7"));

        assert_eq!(wishlist.len(), 1);
    }
}
