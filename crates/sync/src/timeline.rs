//! Deterministic order delivery timeline.
//!
//! A placement event derives the full five-stage timeline up front with
//! fixed wall-clock offsets. Later status changes update the order record
//! directly (see [`crate::model::Order::apply_status`]); the timeline is
//! never re-derived.

use chrono::{DateTime, Duration, Utc};

use driftwood_core::OrderStatus;

use crate::model::TrackingEvent;

/// Days until estimated delivery, counted from placement.
const DELIVERY_DAYS: i64 = 5;

/// Build the five-stage tracking timeline for an order placed at
/// `placed_at`.
///
/// Stages, in order: Placed (+0h, completed), Confirmed (+2h, completed),
/// Shipped (+1d), Out for Delivery (+4d), Delivered (+5d). The first two
/// are completed at creation because orders are auto-confirmed at
/// placement.
#[must_use]
pub fn build_timeline(placed_at: DateTime<Utc>) -> Vec<TrackingEvent> {
    let stage = |status: OrderStatus,
                 label: &str,
                 description: &str,
                 offset: Duration,
                 completed: bool| TrackingEvent {
        status,
        label: label.to_string(),
        description: description.to_string(),
        timestamp: placed_at + offset,
        completed,
    };

    vec![
        stage(
            OrderStatus::Placed,
            "Order Placed",
            "We've received your order.",
            Duration::hours(0),
            true,
        ),
        stage(
            OrderStatus::Confirmed,
            "Order Confirmed",
            "Your order has been confirmed.",
            Duration::hours(2),
            true,
        ),
        stage(
            OrderStatus::Shipped,
            "Shipped",
            "Your order has left the warehouse.",
            Duration::days(1),
            false,
        ),
        stage(
            OrderStatus::OutForDelivery,
            "Out for Delivery",
            "Your order is on its way.",
            Duration::days(4),
            false,
        ),
        stage(
            OrderStatus::Delivered,
            "Delivered",
            "Your order has been delivered.",
            Duration::days(DELIVERY_DAYS),
            false,
        ),
    ]
}

/// Estimated delivery for an order placed at `placed_at`.
#[must_use]
pub fn estimated_delivery(placed_at: DateTime<Utc>) -> DateTime<Utc> {
    placed_at + Duration::days(DELIVERY_DAYS)
}
