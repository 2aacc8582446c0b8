//! Dashboard services, one per managed collection.

pub mod newsletter;
pub mod orders;
pub mod products;
pub mod users;

pub use newsletter::NewsletterAdmin;
pub use orders::OrderAdmin;
pub use products::{NewProduct, ProductAdmin};
pub use users::UserAdmin;
