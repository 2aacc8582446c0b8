//! Product management: the one collection the dashboard fully owns.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tokio::sync::watch;
use tracing::{error, info, instrument};

use voltlane_core::models::Product;
use voltlane_core::types::{Price, ProductId};
use voltlane_remote::{
    Mirror, MirrorOptions, MirrorState, Notifier, OrderBy, SharedStore, collections,
    server_timestamp,
};
use voltlane_storefront::{Navigator, Route};

use crate::error::AdminError;

/// Form input for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub image_url: String,
    pub description: String,
}

impl NewProduct {
    fn validate(&self) -> Result<(), AdminError> {
        if self.name.trim().is_empty() {
            return Err(AdminError::Validation("Product name is required".to_owned()));
        }
        if self.category.trim().is_empty() {
            return Err(AdminError::Validation("Category is required".to_owned()));
        }
        if self.image_url.trim().is_empty() {
            return Err(AdminError::Validation("Image URL is required".to_owned()));
        }
        Ok(())
    }

    fn payload(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "price": self.price,
            "category": self.category.trim(),
            "imageURL": self.image_url.trim(),
            "description": self.description,
            "createdAt": server_timestamp(),
        })
    }
}

/// Product CRUD plus the live list.
pub struct ProductAdmin {
    store: SharedStore,
    notifier: Notifier,
    navigator: Navigator,
    mirror: Mirror<Product>,
}

impl ProductAdmin {
    /// Open the service and its newest-first mirror.
    #[must_use]
    pub fn open(store: SharedStore, notifier: Notifier, navigator: Navigator) -> Self {
        let mirror = Mirror::open(
            Arc::clone(&store),
            collections::PRODUCTS,
            MirrorOptions {
                order_by: OrderBy::asc("createdAt"),
                newest_first: true,
            },
        );
        Self {
            store,
            notifier,
            navigator,
            mirror,
        }
    }

    /// Current product list, newest first.
    #[must_use]
    pub fn state(&self) -> MirrorState<Product> {
        self.mirror.state()
    }

    /// Watch the product list for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MirrorState<Product>> {
        self.mirror.watch()
    }

    /// Wait for the initial snapshot.
    pub async fn wait_loaded(&self) -> MirrorState<Product> {
        self.mirror.wait_loaded().await
    }

    /// Create a product under a service-generated id.
    ///
    /// # Errors
    ///
    /// Validation failures return untoasted; the write outcome is toasted
    /// either way.
    #[instrument(skip_all, fields(name = %new.name))]
    pub async fn create(&self, new: &NewProduct) -> Result<ProductId, AdminError> {
        new.validate()?;
        match self.store.add(collections::PRODUCTS, new.payload()).await {
            Ok(id) => {
                info!(product_id = %id, "product created");
                self.notifier.success("Product added successfully");
                Ok(ProductId::new(id))
            }
            Err(err) => {
                error!(error = %err, "product create failed");
                self.notifier.error("Failed to add product");
                Err(err.into())
            }
        }
    }

    /// Merge `fields` into an existing product.
    ///
    /// A vanished product (deleted under the editor's feet) toasts and
    /// sends the editor back to the dashboard list.
    ///
    /// # Errors
    ///
    /// [`AdminError::NotFound`] when the product no longer exists.
    #[instrument(skip(self, fields))]
    pub async fn update(
        &self,
        id: &ProductId,
        fields: Map<String, Value>,
    ) -> Result<(), AdminError> {
        if self
            .store
            .get(collections::PRODUCTS, id.as_str())
            .await?
            .is_none()
        {
            self.notifier.error("Product not found");
            self.navigator.go(Route::AdminDashboard);
            return Err(AdminError::NotFound(format!("products/{id}")));
        }

        match self
            .store
            .update(collections::PRODUCTS, id.as_str(), fields)
            .await
        {
            Ok(()) => {
                info!("product updated");
                self.notifier.success("Product updated successfully");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "product update failed");
                self.notifier.error("Failed to update product");
                Err(err.into())
            }
        }
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// The write failure, toasted before returning.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), AdminError> {
        match self.store.delete(collections::PRODUCTS, id.as_str()).await {
            Ok(()) => {
                info!("product deleted");
                self.notifier.success("Product deleted successfully");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "product delete failed");
                self.notifier.error("Failed to delete product");
                Err(err.into())
            }
        }
    }

    /// Tear down the mirror.
    pub fn shutdown(&self) {
        self.mirror.shutdown();
    }
}
