//! Order snapshots and the checkout address form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::product::CartItem;
use crate::types::{Email, OrderId, OrderStatus, Price, UserId};

/// Errors from validating an [`AddressInfo`] form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field was left blank.
    #[error("{0} is required")]
    Missing(&'static str),
    /// Zip code must be digits only.
    #[error("zip code must be numeric")]
    InvalidZipCode,
    /// Mobile number must be 10-15 digits.
    #[error("mobile number must be 10-15 digits")]
    InvalidMobileNumber,
}

/// Shipping address collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    /// Recipient name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Postal code, digits only.
    pub zip_code: String,
    /// Contact number, 10-15 digits.
    pub mobile_number: String,
}

impl AddressInfo {
    /// Apply the checkout form's client-side rules.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule; callers surface it inline per
    /// field, before any remote call is made.
    pub fn validate(&self) -> Result<(), AddressError> {
        if self.name.trim().is_empty() {
            return Err(AddressError::Missing("name"));
        }
        if self.address.trim().is_empty() {
            return Err(AddressError::Missing("address"));
        }
        if self.zip_code.trim().is_empty() {
            return Err(AddressError::Missing("zip code"));
        }
        if !self.zip_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidZipCode);
        }
        if self.mobile_number.trim().is_empty() {
            return Err(AddressError::Missing("mobile number"));
        }
        let digits = self.mobile_number.chars().filter(char::is_ascii_digit).count();
        if digits < 10 || digits > 15 || !self.mobile_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidMobileNumber);
        }
        Ok(())
    }
}

/// An order recorded at checkout.
///
/// Created once as an immutable snapshot of the cart, the submitted
/// address, and the user's identity; the storefront never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Document id (client-generated at submission).
    pub id: OrderId,
    /// Deep snapshot of the cart at submission time.
    pub cart_items: Vec<CartItem>,
    /// Shipping address as submitted.
    pub address_info: AddressInfo,
    /// Email of the ordering user.
    pub email: Email,
    /// Uid of the ordering user.
    pub user_uid: UserId,
    /// Lifecycle status; orders are created as `confirmed`.
    #[serde(default)]
    pub status: OrderStatus,
    /// Server-assigned submission time.
    pub time: DateTime<Utc>,
}

impl Order {
    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart_items
            .iter()
            .fold(Price::ZERO, |acc, item| acc.plus(item.line_total()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> AddressInfo {
        AddressInfo {
            name: "Ada Lovelace".to_owned(),
            address: "12 Analytical Way".to_owned(),
            zip_code: "10115".to_owned(),
            mobile_number: "4915223433333".to_owned(),
        }
    }

    #[test]
    fn valid_addresses_pass() {
        assert_eq!(address().validate(), Ok(()));
    }

    #[test]
    fn blank_and_malformed_fields_are_rejected() {
        let mut a = address();
        a.name = "  ".to_owned();
        assert_eq!(a.validate(), Err(AddressError::Missing("name")));

        let mut a = address();
        a.zip_code = "1O115".to_owned();
        assert_eq!(a.validate(), Err(AddressError::InvalidZipCode));

        let mut a = address();
        a.mobile_number = "12345".to_owned();
        assert_eq!(a.validate(), Err(AddressError::InvalidMobileNumber));
    }
}
