//! Voltlane Admin - dashboard state layer.
//!
//! Management views over the same remote document service the storefront
//! uses: product CRUD, order list and removal, read-only customer and
//! newsletter-subscriber lists. Everything is gated on the session's
//! profile carrying the admin role.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod error;
pub mod services;
pub mod state;

pub use access::require_admin;
pub use error::AdminError;
pub use services::{NewProduct, NewsletterAdmin, OrderAdmin, ProductAdmin, UserAdmin};
pub use state::AdminApp;
