//! Integration tests for Driftwood.
//!
//! The scenarios in `tests/` exercise the full engine in-process: a
//! [`MockRemote`] stands in for the remote resource service, so session
//! transitions, optimistic overlays, and background reconciliation run
//! against a scriptable, inspectable backend instead of a live server.
//!
//! Run with: `cargo test -p driftwood-integration-tests`

use std::sync::{Mutex, MutexGuard, PoisonError};

use driftwood_core::{CurrencyCode, Price, ResourceId};
use driftwood_sync::{CartLine, RemoteCollectionService, RemoteError, RemoteItem};

/// Scriptable in-process remote resource service.
///
/// Behaves like a tiny server: `add` merges same-key items by summing,
/// `update` sets an absolute quantity, `remove` deletes. Every mutation is
/// recorded so tests can assert on the exact call sequence, and the whole
/// service can be switched into a failing mode to exercise offline paths.
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    items: Vec<RemoteItem>,
    failing: bool,
    calls: Vec<String>,
}

impl MockRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote that already holds a server-side collection.
    #[must_use]
    pub fn with_items(items: Vec<RemoteItem>) -> Self {
        Self {
            state: Mutex::new(MockState {
                items,
                ..MockState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the server-side collection out from under the engine,
    /// as another device mutating the same account would.
    pub fn set_items(&self, items: Vec<RemoteItem>) {
        self.lock().items = items;
    }

    /// Make every call fail with a 503 until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Current server-side items.
    #[must_use]
    pub fn items(&self) -> Vec<RemoteItem> {
        self.lock().items.clone()
    }

    /// Mutation calls observed so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn check_available(state: &MockState) -> Result<(), RemoteError> {
        if state.failing {
            return Err(RemoteError::Status {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn same_key(item: &RemoteItem, id: &ResourceId, variant: Option<&str>) -> bool {
    item.resource_id == *id && item.variant.as_deref() == variant
}

impl RemoteCollectionService for MockRemote {
    async fn list(&self) -> Result<Vec<RemoteItem>, RemoteError> {
        let state = self.lock();
        Self::check_available(&state)?;
        Ok(state.items.clone())
    }

    async fn add(
        &self,
        id: &ResourceId,
        variant: Option<&str>,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state.calls.push(format!("add {id} {variant:?} {quantity}"));

        if let Some(existing) = state.items.iter_mut().find(|i| same_key(i, id, variant)) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            state.items.push(remote_item_raw(id.clone(), variant, quantity));
        }
        Ok(())
    }

    async fn update(
        &self,
        id: &ResourceId,
        variant: Option<&str>,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state
            .calls
            .push(format!("update {id} {variant:?} {quantity}"));

        if let Some(existing) = state.items.iter_mut().find(|i| same_key(i, id, variant)) {
            existing.quantity = quantity;
        }
        Ok(())
    }

    async fn remove(&self, id: &ResourceId, variant: Option<&str>) -> Result<(), RemoteError> {
        let mut state = self.lock();
        Self::check_available(&state)?;
        state.calls.push(format!("remove {id} {variant:?}"));
        state.items.retain(|i| !same_key(i, id, variant));
        Ok(())
    }
}

fn remote_item_raw(id: ResourceId, variant: Option<&str>, quantity: u32) -> RemoteItem {
    RemoteItem {
        resource_id: id,
        variant: variant.map(str::to_string),
        quantity,
        name: None,
        unit_price: None,
        reference_price: None,
        image: None,
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A remote snapshot item with display fields filled in.
#[must_use]
pub fn remote_item(id: i64, variant: Option<&str>, quantity: u32) -> RemoteItem {
    RemoteItem {
        resource_id: ResourceId::from(id),
        variant: variant.map(str::to_string),
        quantity,
        name: Some(format!("Product {id}")),
        unit_price: Some(Price::from_minor_units(1500, CurrencyCode::USD)),
        reference_price: None,
        image: None,
    }
}

/// A cart line priced at $15.00 per unit.
#[must_use]
pub fn cart_line(id: i64, variant: Option<&str>, quantity: u32) -> CartLine {
    CartLine {
        id: ResourceId::from(id),
        name: format!("Product {id}"),
        unit_price: Price::from_minor_units(1500, CurrencyCode::USD),
        reference_price: None,
        image: None,
        variant: variant.map(str::to_string),
        quantity,
    }
}

/// Let spawned fire-and-forget remote mutations run to completion on the
/// current-thread test runtime.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
