//! Saved postal addresses.

use serde::{Deserialize, Serialize};

use driftwood_core::{AddressId, AddressLabel};

/// A saved postal address owned by one visitor scope.
///
/// At most one address per owner has `is_default = true`; the
/// [`crate::AddressBook`] enforces this by construction on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    /// Engine-generated identity.
    pub id: AddressId,
    /// Category tag (home/work/other).
    pub label: AddressLabel,
    /// Recipient full name.
    pub recipient: String,
    /// Street address, first line.
    pub line1: String,
    /// Street address, second line.
    pub line2: Option<String>,
    pub city: String,
    /// State, province, or region.
    pub region: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub phone: Option<String>,
    /// Whether this is the owner's default shipping address.
    pub is_default: bool,
}

/// Input for saving a new address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub label: AddressLabel,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    /// Request this address become the default. The first address saved for
    /// an owner becomes the default regardless.
    pub make_default: bool,
}

impl NewAddress {
    /// Materialize with a fresh id. Exclusivity of `is_default` is the
    /// address book's responsibility.
    #[must_use]
    pub fn into_saved(self, is_default: bool) -> SavedAddress {
        SavedAddress {
            id: AddressId::generate(),
            label: self.label,
            recipient: self.recipient,
            line1: self.line1,
            line2: self.line2,
            city: self.city,
            region: self.region,
            postal_code: self.postal_code,
            country: self.country,
            phone: self.phone,
            is_default,
        }
    }
}
