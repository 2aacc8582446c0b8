//! Voltlane Storefront - customer-facing state layer.
//!
//! This crate owns everything between the UI and the remote document
//! service: the session store, the live catalog replica, the per-user
//! cart synchronizer, checkout, favorites, newsletter signup, and the
//! account flows. It renders nothing; the UI observes watch channels and
//! drains the toast and navigation streams.
//!
//! # Lifecycle
//!
//! [`state::StorefrontApp::start`] wires the components together and
//! bridges session transitions into cart and favorites lifecycles. All
//! background tasks end when the app is dropped.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod navigate;
pub mod newsletter;
pub mod session;
pub mod state;

pub use auth::AuthService;
pub use cart::{CartPhase, CartState, CartSync};
pub use catalog::Catalog;
pub use checkout::{CheckoutService, generate_order_id};
pub use config::{ConfigError, StorefrontConfig};
pub use error::AppError;
pub use favorites::{FavoritesState, FavoritesSync};
pub use navigate::{Navigator, Route};
pub use newsletter::NewsletterService;
pub use session::{Profile, SessionState, SessionStore};
pub use state::StorefrontApp;
