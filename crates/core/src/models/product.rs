//! Product catalog documents and cart line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A catalog product.
///
/// Read-only from the storefront's perspective: the catalog mirror
/// replaces its local copy wholesale on every remote change notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price, non-negative.
    pub price: Price,
    /// Category label, e.g. "Laptop" or "Headphones".
    pub category: String,
    /// Product image location.
    #[serde(rename = "imageURL")]
    pub image_url: String,
    /// Longer description; optional in older documents.
    #[serde(default)]
    pub description: String,
    /// Server-assigned creation time; drives catalog ordering.
    pub created_at: DateTime<Utc>,
}

/// One cart line: a product snapshot plus a quantity.
///
/// The cart holds at most one entry per product id; adding the same
/// product again increments the quantity in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    /// The product at the time it was added.
    #[serde(flatten)]
    pub product: Product,
    /// Units of the product; never below 1.
    pub quantity: u32,
}

impl CartItem {
    /// A fresh line for one unit of `product`.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.line_total(self.quantity)
    }
}
