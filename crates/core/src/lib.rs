//! Voltlane Core - Shared types library.
//!
//! This crate provides common types used across all Voltlane components:
//! - `storefront` - Customer-facing state layer (catalog, cart, checkout)
//! - `admin` - Dashboard state layer (product/order/user management)
//! - `cli` - Command-line tools for seeding and administration
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no network clients, no
//! knowledge of the remote document service. This keeps it lightweight and
//! allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`models`] - Domain models decoded from remote documents (users,
//!   products, cart items, orders, newsletter subscribers)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
