//! User profile documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, ProductId, UserId, UserRole};

/// A user profile stored in the `users` collection, keyed by auth uid.
///
/// Mutated by the favorites toggle (the `favorites` array) and by admin
/// edits; destroyed only server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document id; equals the auth uid.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Account email.
    pub email: Email,
    /// Role; defaults to a regular shopper when absent.
    #[serde(default)]
    pub role: UserRole,
    /// Favorited product ids. Order is not meaningful.
    #[serde(default)]
    pub favorites: Vec<ProductId>,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may access the admin dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
