//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order delivery status.
///
/// Orders move forward through the first five stages; `Cancelled` is a
/// terminal side-exit. Stage ordering is used when applying a status update
/// to an order's tracking timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Placed,
    Confirmed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Position in the forward delivery sequence, if this status is part
    /// of it. `Cancelled` has no stage.
    #[must_use]
    pub const fn stage_index(&self) -> Option<usize> {
        match self {
            Self::Placed => Some(0),
            Self::Confirmed => Some(1),
            Self::Shipped => Some(2),
            Self::OutForDelivery => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }

    /// Whether this status terminates the order lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Payment method captured on an order at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    CashOnDelivery,
    Wallet,
}

/// Category tag for a saved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressLabel {
    #[default]
    Home,
    Work,
    Other,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering() {
        assert_eq!(OrderStatus::Placed.stage_index(), Some(0));
        assert_eq!(OrderStatus::Delivered.stage_index(), Some(4));
        assert_eq!(OrderStatus::Cancelled.stage_index(), None);
        assert!(
            OrderStatus::Confirmed.stage_index().unwrap()
                < OrderStatus::Shipped.stage_index().unwrap()
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_serde_rename_all() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"OUT_FOR_DELIVERY\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cash_on_delivery\""
        );
        let label: AddressLabel = serde_json::from_str("\"work\"").unwrap();
        assert_eq!(label, AddressLabel::Work);
    }
}
