//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_uuid_id!` macro to create type-safe ID wrappers that
//! prevent accidentally mixing IDs from different entity types. These are
//! engine-generated identities (orders, saved addresses); catalog resources
//! use [`crate::ResourceId`] instead because their ids come from the remote
//! service in heterogeneous shapes.

/// Macro to define a type-safe UUID-backed ID wrapper.
///
/// Creates a newtype wrapper around [`uuid::Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - A `generate()` constructor and `as_uuid()` accessor
/// - `From<Uuid>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use driftwood_core::define_uuid_id;
/// define_uuid_id!(OrderId);
/// define_uuid_id!(AddressId);
///
/// let order_id = OrderId::generate();
/// let address_id = AddressId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = address_id;
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Create an ID from an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_uuid_id!(OrderId);
define_uuid_id!(AddressId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
    }

    #[test]
    fn test_serde_transparent() {
        let id = AddressId::generate();
        let json = serde_json::to_string(&id).unwrap();
        let back: AddressId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
        // Serialized form is the bare UUID string, no wrapper object.
        assert!(json.starts_with('"'));
    }

    #[test]
    fn test_display_round_trip() {
        let id = OrderId::generate();
        let parsed = uuid::Uuid::parse_str(&id.to_string()).unwrap();
        assert_eq!(OrderId::from(parsed), id);
    }
}
