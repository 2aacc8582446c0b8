//! Order status and user role enums.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Orders are created as [`OrderStatus::Confirmed`] at checkout; later
/// transitions are applied by the admin dashboard only. The storefront
/// never mutates an order after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order recorded; the fixed initial status.
    #[default]
    Confirmed,
    /// Order handed to the carrier.
    Shipped,
    /// Order delivered to the customer.
    Delivered,
    /// Order cancelled by an administrator.
    Cancelled,
}

impl OrderStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Role recorded on a user profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    User,
    /// Dashboard administrator.
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).expect("serialize");
        assert_eq!(json, "\"confirmed\"");

        let role: UserRole = serde_json::from_str("\"admin\"").expect("deserialize");
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }
}
