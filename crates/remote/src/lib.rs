//! Voltlane Remote - the remote document service boundary.
//!
//! Persistence, authentication, and real-time sync for Voltlane are
//! delegated to a hosted document service. This crate defines the small
//! operation set the rest of the workspace consumes ([`DocumentStore`],
//! [`AuthGateway`]) and ships two backends:
//!
//! - [`memory::MemoryRemote`] - in-process backend for tests, seeding, and
//!   local development. Implements both traits, including ordered query
//!   subscriptions, compare-and-swap versioning, and password accounts.
//! - [`rest::RestRemote`] - HTTP backend over a vendor-neutral JSON
//!   document API with ETag versioning and polling subscriptions.
//!
//! Documents are schemaless [`serde_json::Value`] payloads at this
//! boundary; callers decode them into typed models via
//! [`Document::decode`], which fails fast with a typed [`DecodeError`]
//! instead of propagating missing fields.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod error;
pub mod memory;
pub mod mirror;
pub mod notify;
pub mod rest;
pub mod store;
pub mod types;

pub use auth::{AuthGateway, SharedAuth};
pub use error::{DecodeError, RemoteError};
pub use mirror::{Mirror, MirrorOptions, MirrorState};
pub use notify::{Notification, NotificationKind, Notifier};
pub use store::{DocumentStore, SharedStore};
pub use types::{
    Direction, Document, OrderBy, Principal, QuerySnapshot, SERVER_TIMESTAMP, Subscription,
    server_timestamp,
};

/// Collection names used by the storefront and admin dashboard.
pub mod collections {
    /// User profile documents, keyed by auth uid.
    pub const USERS: &str = "users";
    /// Product catalog documents.
    pub const PRODUCTS: &str = "products";
    /// Per-user cart documents, keyed by user id.
    pub const CARTS: &str = "carts";
    /// Immutable order snapshots.
    pub const ORDERS: &str = "orders";
    /// Newsletter subscriber records.
    pub const NEWSLETTER: &str = "newsletter";
}
