//! Driftwood Sync - dual-mode resource synchronization engine.
//!
//! Keeps client-visible cart, wishlist, address, and order state consistent
//! across three hard constraints:
//!
//! - an anonymous visitor keeps working state in local persistent storage
//!   with no server account,
//! - an authenticated visitor's state is sourced from the remote resource
//!   service yet stays responsive despite network latency,
//! - a login/logout swaps the source of truth without data loss or duplicate
//!   entries.
//!
//! # Architecture
//!
//! - [`storage`] - scoped persistence over a synchronous key-value store
//! - [`overlay`] - optimistic mutations pending remote confirmation
//! - [`remote`] - the remote resource service seam and its HTTP client
//! - [`store`] - the dual-mode store generic over a [`model::ResourceCollection`]
//! - [`timeline`] - deterministic order delivery timeline
//! - [`session`] - owner identity and the per-application-root [`session::SyncContext`]
//!
//! View code talks to one [`session::SyncContext`] constructed at the
//! application root; there are no module-level singletons.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use driftwood_sync::{SyncConfig, SyncContext};
//!
//! let config = SyncConfig::from_env()?;
//! let ctx = SyncContext::from_config(&config);
//!
//! // Anonymous mutations persist locally and return immediately.
//! ctx.cart().add(line);
//!
//! // Login re-points every store at the user scope and fetches fresh
//! // remote snapshots; the anonymous cart stays dormant under its own key.
//! ctx.login("customer-581").await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address_book;
pub mod config;
pub mod model;
pub mod order_history;
pub mod overlay;
pub mod remote;
pub mod session;
pub mod storage;
pub mod store;
pub mod timeline;

pub use address_book::AddressBook;
pub use config::{ConfigError, RemoteConfig, SyncConfig};
pub use model::{Cart, CartLine, LineKey, ResourceCollection, Wishlist};
pub use model::{NewAddress, SavedAddress};
pub use model::{Order, TrackingEvent};
pub use order_history::{OrderError, OrderHistory};
pub use overlay::Overlay;
pub use remote::{HttpRemoteService, RemoteCollectionService, RemoteError, RemoteItem};
pub use session::{OwnerIdentity, SyncContext};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, ScopedStore};
pub use store::{CartStore, DualModeStore, WishlistStore};
pub use timeline::{build_timeline, estimated_delivery};
