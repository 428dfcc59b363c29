//! Placed orders and their tracking timeline.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::{OrderId, OrderStatus, PaymentMethod};

use super::address::SavedAddress;
use super::cart::CartLine;

/// One stage of an order's delivery timeline.
///
/// Derived once from the placement time (see [`crate::timeline`]); later
/// status changes flip `completed` flags as discrete updates and never
/// re-derive timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: OrderStatus,
    /// Short display label (e.g., "Out for Delivery").
    pub label: String,
    /// One-line description for the timeline UI.
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub completed: bool,
}

/// A placed order.
///
/// Immutable after placement except for `status` and `tracking`. Line items
/// and the shipping address are value snapshots taken at checkout, not live
/// references into the cart or address book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Snapshot of the cart lines at placement time.
    pub lines: Vec<CartLine>,
    /// Snapshot of the shipping address at placement time.
    pub address: SavedAddress,
    /// Order total at placement time.
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    /// Delivery timeline, in stage order.
    pub tracking: Vec<TrackingEvent>,
}

impl Order {
    /// Apply a discrete status update.
    ///
    /// Sets `status` and marks every timeline stage up to and including the
    /// new status as completed. `Cancelled` has no timeline stage, so it
    /// only changes `status`.
    pub fn apply_status(&mut self, status: OrderStatus) {
        self.status = status;
        if let Some(stage) = status.stage_index() {
            for event in &mut self.tracking {
                if event.status.stage_index().is_some_and(|s| s <= stage) {
                    event.completed = true;
                }
            }
        }
    }
}
