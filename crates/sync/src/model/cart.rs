//! Cart collection with quantity-merge semantics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::{Price, ResourceId};

use super::ResourceCollection;
use crate::remote::RemoteItem;

/// Identity of a cart line.
///
/// Two additions of the same resource with the same variant merge into one
/// line; different variants of the same resource coexist as separate lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    /// Normalized resource identifier.
    pub id: ResourceId,
    /// Variant selector (e.g., color), when the product has one.
    pub variant: Option<String>,
}

impl LineKey {
    /// Create a line key.
    pub fn new(id: impl Into<ResourceId>, variant: Option<&str>) -> Self {
        Self {
            id: id.into(),
            variant: variant.map(str::to_string),
        }
    }
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Normalized resource identifier.
    pub id: ResourceId,
    /// Product display name.
    pub name: String,
    /// Current unit price.
    pub unit_price: Price,
    /// Compare-at price, when the product is discounted.
    pub reference_price: Option<Price>,
    /// Product image URL.
    pub image: Option<String>,
    /// Variant selector (e.g., color).
    pub variant: Option<String>,
    /// Units of this line; always >= 1 for a line that exists.
    pub quantity: u32,
}

impl CartLine {
    /// Identity of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            id: self.id.clone(),
            variant: self.variant.clone(),
        }
    }

    /// Line subtotal (`unit_price * quantity`).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.line_total(self.quantity)
    }
}

/// A cart: ordered lines keyed by (resource id, variant).
///
/// Insertion order is preserved so the UI renders lines in the order the
/// visitor added them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Borrow the lines in collection order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|line| line.key() == *key)
    }
}

impl ResourceCollection for Cart {
    type Item = CartLine;
    type Key = LineKey;

    fn key_of(item: &Self::Item) -> Self::Key {
        item.key()
    }

    fn add(&mut self, item: Self::Item) {
        match self.position(&item.key()) {
            Some(index) => {
                if let Some(existing) = self.lines.get_mut(index) {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
            }
            None => self.lines.push(item),
        }
    }

    fn set(&mut self, item: Self::Item) {
        match self.position(&item.key()) {
            Some(index) => {
                if let Some(existing) = self.lines.get_mut(index) {
                    *existing = item;
                }
            }
            None => self.lines.push(item),
        }
    }

    fn remove(&mut self, key: &Self::Key) -> bool {
        match self.position(key) {
            Some(index) => {
                self.lines.remove(index);
                true
            }
            None => false,
        }
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Item> {
        self.position(key).and_then(|index| self.lines.get(index))
    }

    fn items(&self) -> Vec<Self::Item> {
        self.lines.clone()
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn unit_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    fn from_snapshot(items: Vec<RemoteItem>) -> Self {
        let lines = items
            .into_iter()
            .filter(|item| item.quantity >= 1)
            .map(RemoteItem::into_cart_line)
            .collect();
        Self { lines }
    }

    fn remote_key(key: &Self::Key) -> (ResourceId, Option<String>) {
        (key.id.clone(), key.variant.clone())
    }

    fn remote_quantity(item: &Self::Item) -> u32 {
        item.quantity
    }
}
