//! Owner-scoped order history.
//!
//! Append-only: orders are created at checkout and never deleted. After
//! placement only `status` and `tracking` change, through discrete updates
//! (e.g., payment confirmation). Placement is a foreground action, so unlike
//! the fire-and-forget collection mutations it returns a definitive result.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use driftwood_core::{OrderId, OrderStatus, PaymentMethod};

use crate::model::{CartLine, Order, SavedAddress};
use crate::session::OwnerIdentity;
use crate::storage::{KeyValueStore, ScopedStore};
use crate::timeline::{build_timeline, estimated_delivery};

/// Errors placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout submitted with an empty cart.
    #[error("cannot place an order with no lines")]
    EmptyOrder,
}

struct HistoryState {
    identity: OwnerIdentity,
    orders: Vec<Order>,
}

/// Order history for the current owner.
pub struct OrderHistory {
    storage: ScopedStore<Vec<Order>>,
    state: Mutex<HistoryState>,
}

impl OrderHistory {
    /// Create a history in anonymous mode, loading the anonymous scope's
    /// past orders.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let storage = ScopedStore::new(backend, "orders");
        let orders = storage.read(&OwnerIdentity::Anonymous);

        Self {
            storage,
            state: Mutex::new(HistoryState {
                identity: OwnerIdentity::Anonymous,
                orders,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &HistoryState) {
        self.storage.write(&state.identity, &state.orders);
    }

    /// Place an order now.
    ///
    /// Lines and address are snapshotted by value; the live cart and address
    /// book are untouched. The five-stage delivery timeline is derived once
    /// from the placement time.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyOrder`] if `lines` is empty.
    pub fn place(
        &self,
        lines: Vec<CartLine>,
        address: SavedAddress,
        payment_method: PaymentMethod,
    ) -> Result<Order, OrderError> {
        self.place_at(lines, address, payment_method, Utc::now())
    }

    /// Place an order with an explicit placement time.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyOrder`] if `lines` is empty.
    #[instrument(skip(self, lines, address), fields(lines = lines.len()))]
    pub fn place_at(
        &self,
        lines: Vec<CartLine>,
        address: SavedAddress,
        payment_method: PaymentMethod,
        placed_at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let total = lines.iter().map(CartLine::subtotal).sum();
        let order = Order {
            id: OrderId::generate(),
            lines,
            address,
            total,
            payment_method,
            status: OrderStatus::Placed,
            placed_at,
            estimated_delivery: estimated_delivery(placed_at),
            tracking: build_timeline(placed_at),
        };

        let mut state = self.lock();
        state.orders.push(order.clone());
        self.persist(&state);
        Ok(order)
    }

    /// Apply a discrete status update (e.g., payment confirmation) to an
    /// order. Returns whether the order exists.
    pub fn update_status(&self, id: OrderId, status: OrderStatus) -> bool {
        let mut state = self.lock();

        let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        order.apply_status(status);
        self.persist(&state);
        true
    }

    /// Look up an order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.lock().orders.iter().find(|o| o.id == id).cloned()
    }

    /// All orders, most recent first.
    #[must_use]
    pub fn all(&self) -> Vec<Order> {
        let state = self.lock();
        let mut orders = state.orders.clone();
        orders.reverse();
        orders
    }

    /// Re-point at a new owner, reloading that owner's history.
    pub fn set_identity(&self, identity: OwnerIdentity) {
        let mut state = self.lock();
        state.orders = self.storage.read(&identity);
        state.identity = identity;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use driftwood_core::AddressLabel;
    use rust_decimal::Decimal;

    use crate::model::cart::tests::line;
    use crate::storage::MemoryStore;

    use super::*;

    fn address() -> SavedAddress {
        SavedAddress {
            id: driftwood_core::AddressId::generate(),
            label: AddressLabel::Home,
            recipient: "A. Visitor".to_string(),
            line1: "1 Harbor Way".to_string(),
            line2: None,
            city: "Astoria".to_string(),
            region: "OR".to_string(),
            postal_code: "97103".to_string(),
            country: "US".to_string(),
            phone: None,
            is_default: true,
        }
    }

    fn history() -> OrderHistory {
        OrderHistory::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_place_snapshots_lines_and_computes_total() {
        let history = history();
        let order = history
            .place(vec![line(1, None, 2), line(2, None, 1)], address(), PaymentMethod::Card)
            .unwrap();

        // 3 units at $10.00 each.
        assert_eq!(order.total, Decimal::new(3000, 2));
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.tracking.len(), 5);
        assert_eq!(history.get(order.id).unwrap(), order);
    }

    #[test]
    fn test_place_empty_cart_is_rejected() {
        let history = history();
        let result = history.place(Vec::new(), address(), PaymentMethod::Card);
        assert!(matches!(result, Err(OrderError::EmptyOrder)));
        assert!(history.all().is_empty());
    }

    #[test]
    fn test_estimated_delivery_and_timeline_from_placement_time() {
        let history = history();
        let placed_at = "2024-01-10T00:00:00Z".parse().unwrap();
        let order = history
            .place_at(vec![line(1, None, 1)], address(), PaymentMethod::Wallet, placed_at)
            .unwrap();

        assert_eq!(
            order.estimated_delivery,
            "2024-01-15T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        let shipped = order.tracking.get(2).unwrap();
        assert_eq!(
            shipped.timestamp,
            "2024-01-11T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_update_status_is_a_discrete_update() {
        let history = history();
        let order = history
            .place(vec![line(1, None, 1)], address(), PaymentMethod::Card)
            .unwrap();

        assert!(history.update_status(order.id, OrderStatus::Confirmed));

        let updated = history.get(order.id).unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);
        // Timestamps derived at placement are untouched.
        assert_eq!(
            updated.tracking.iter().map(|e| e.timestamp).collect::<Vec<_>>(),
            order.tracking.iter().map(|e| e.timestamp).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_update_status_unknown_order() {
        let history = history();
        assert!(!history.update_status(OrderId::generate(), OrderStatus::Shipped));
    }

    #[test]
    fn test_history_is_append_only_and_newest_first() {
        let history = history();
        let first = history
            .place(vec![line(1, None, 1)], address(), PaymentMethod::Card)
            .unwrap();
        let second = history
            .place(vec![line(2, None, 1)], address(), PaymentMethod::Card)
            .unwrap();

        let all = history.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all.first().unwrap().id, second.id);
        assert_eq!(all.get(1).unwrap().id, first.id);
    }

    #[test]
    fn test_history_survives_identity_round_trip() {
        let history = history();
        let order = history
            .place(vec![line(1, None, 1)], address(), PaymentMethod::Card)
            .unwrap();

        history.set_identity(OwnerIdentity::user("u1"));
        assert!(history.all().is_empty());

        history.set_identity(OwnerIdentity::Anonymous);
        assert_eq!(history.all().first().unwrap().id, order.id);
    }
}
