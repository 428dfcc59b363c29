//! Owner-scoped saved addresses.
//!
//! Single-mode variant of the resource store: the address book always
//! persists through the scoped adapter under the current owner's key, with
//! no remote overlay. The default-address invariant (at most one default
//! per owner) is enforced by construction in every mutation path rather
//! than detected after the fact.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use driftwood_core::AddressId;

use crate::model::{NewAddress, SavedAddress};
use crate::session::OwnerIdentity;
use crate::storage::{KeyValueStore, ScopedStore};

struct BookState {
    identity: OwnerIdentity,
    entries: Vec<SavedAddress>,
}

/// Saved addresses for the current owner.
pub struct AddressBook {
    storage: ScopedStore<Vec<SavedAddress>>,
    state: Mutex<BookState>,
}

impl AddressBook {
    /// Create a book in anonymous mode, loading the anonymous scope's
    /// saved addresses.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let storage = ScopedStore::new(backend, "addresses");
        let entries = storage.read(&OwnerIdentity::Anonymous);

        Self {
            storage,
            state: Mutex::new(BookState {
                identity: OwnerIdentity::Anonymous,
                entries,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &BookState) {
        self.storage.write(&state.identity, &state.entries);
    }

    /// Save a new address; returns its generated id.
    ///
    /// The first address saved for an owner becomes the default regardless
    /// of the request; an explicit `make_default` demotes the previous
    /// default.
    pub fn add(&self, address: NewAddress) -> AddressId {
        let mut state = self.lock();

        let make_default = address.make_default || state.entries.is_empty();
        if make_default {
            for entry in &mut state.entries {
                entry.is_default = false;
            }
        }

        let saved = address.into_saved(make_default);
        let id = saved.id;
        state.entries.push(saved);
        self.persist(&state);
        id
    }

    /// Replace a saved address wholesale (matched by id). Returns whether
    /// it existed. Setting `is_default` demotes the previous default.
    pub fn update(&self, address: SavedAddress) -> bool {
        let mut state = self.lock();

        let Some(index) = state.entries.iter().position(|e| e.id == address.id) else {
            return false;
        };

        if address.is_default {
            for entry in &mut state.entries {
                entry.is_default = false;
            }
        }
        if let Some(slot) = state.entries.get_mut(index) {
            *slot = address;
        }
        self.persist(&state);
        true
    }

    /// Delete an address. Deleting the sole default promotes an arbitrary
    /// remaining address (the first) to default. Returns whether it existed.
    pub fn delete(&self, id: AddressId) -> bool {
        let mut state = self.lock();

        let Some(index) = state.entries.iter().position(|e| e.id == id) else {
            return false;
        };

        let removed = state.entries.remove(index);
        if removed.is_default {
            if let Some(first) = state.entries.first_mut() {
                first.is_default = true;
            }
        }
        self.persist(&state);
        true
    }

    /// Make `id` the owner's sole default. Returns whether it existed.
    pub fn set_default(&self, id: AddressId) -> bool {
        let mut state = self.lock();

        if !state.entries.iter().any(|e| e.id == id) {
            return false;
        }

        for entry in &mut state.entries {
            entry.is_default = entry.id == id;
        }
        self.persist(&state);
        true
    }

    /// The owner's default address, if any are saved.
    #[must_use]
    pub fn default_address(&self) -> Option<SavedAddress> {
        self.lock().entries.iter().find(|e| e.is_default).cloned()
    }

    /// Look up an address by id.
    #[must_use]
    pub fn get(&self, id: AddressId) -> Option<SavedAddress> {
        self.lock().entries.iter().find(|e| e.id == id).cloned()
    }

    /// All saved addresses, in save order.
    #[must_use]
    pub fn all(&self) -> Vec<SavedAddress> {
        self.lock().entries.clone()
    }

    /// Re-point at a new owner, reloading that owner's saved addresses.
    pub fn set_identity(&self, identity: OwnerIdentity) {
        let mut state = self.lock();
        state.entries = self.storage.read(&identity);
        state.identity = identity;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use driftwood_core::AddressLabel;

    use crate::storage::MemoryStore;

    use super::*;

    fn new_address(recipient: &str, make_default: bool) -> NewAddress {
        NewAddress {
            label: AddressLabel::Home,
            recipient: recipient.to_string(),
            line1: "1 Harbor Way".to_string(),
            line2: None,
            city: "Astoria".to_string(),
            region: "OR".to_string(),
            postal_code: "97103".to_string(),
            country: "US".to_string(),
            phone: None,
            make_default,
        }
    }

    fn book() -> AddressBook {
        AddressBook::new(Arc::new(MemoryStore::new()))
    }

    fn default_count(book: &AddressBook) -> usize {
        book.all().iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_first_address_becomes_default() {
        let book = book();
        let id = book.add(new_address("A", false));

        assert_eq!(book.default_address().unwrap().id, id);
    }

    #[test]
    fn test_at_most_one_default_across_mutations() {
        let book = book();
        let a = book.add(new_address("A", false));
        let b = book.add(new_address("B", true));
        assert_eq!(default_count(&book), 1);
        assert_eq!(book.default_address().unwrap().id, b);

        book.set_default(a);
        assert_eq!(default_count(&book), 1);
        assert_eq!(book.default_address().unwrap().id, a);

        let mut updated = book.get(b).unwrap();
        updated.is_default = true;
        book.update(updated);
        assert_eq!(default_count(&book), 1);
        assert_eq!(book.default_address().unwrap().id, b);
    }

    #[test]
    fn test_deleting_sole_default_promotes_survivor() {
        let book = book();
        let a = book.add(new_address("A", false)); // becomes default
        let b = book.add(new_address("B", false));

        assert!(book.delete(a));
        assert_eq!(book.default_address().unwrap().id, b);
        assert_eq!(default_count(&book), 1);
    }

    #[test]
    fn test_deleting_last_address_leaves_no_default() {
        let book = book();
        let a = book.add(new_address("A", false));

        assert!(book.delete(a));
        assert!(book.default_address().is_none());
        assert!(book.all().is_empty());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let book = book();
        book.add(new_address("A", false));

        assert!(!book.delete(AddressId::generate()));
        assert_eq!(book.all().len(), 1);
    }

    #[test]
    fn test_addresses_are_owner_scoped() {
        let backend = Arc::new(MemoryStore::new());
        let book = AddressBook::new(backend);
        book.add(new_address("Anon", false));

        book.set_identity(OwnerIdentity::user("u1"));
        assert!(book.all().is_empty());

        book.add(new_address("User", false));
        book.set_identity(OwnerIdentity::Anonymous);
        assert_eq!(book.all().len(), 1);
        assert_eq!(book.all().first().unwrap().recipient, "Anon");
    }
}
