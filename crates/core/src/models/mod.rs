//! Domain models for Voltlane.
//!
//! These are the typed shapes of the remote document payloads. Field names
//! follow the stored camelCase convention; decoding happens at the remote
//! boundary so undefined fields never propagate into application state.

pub mod newsletter;
pub mod order;
pub mod product;
pub mod user;

pub use newsletter::NewsletterSubscriber;
pub use order::{AddressError, AddressInfo, Order};
pub use product::{CartItem, Product};
pub use user::User;
