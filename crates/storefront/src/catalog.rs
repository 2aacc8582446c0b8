//! Catalog mirror: live read-only replica of the product collection.
//!
//! Ordered by creation time on the service, reversed locally so the
//! newest product renders first. Lookup helpers run against the replica;
//! no remote round-trip per query.

use tokio::sync::watch;

use voltlane_core::models::Product;
use voltlane_core::types::ProductId;
use voltlane_remote::{Mirror, MirrorOptions, MirrorState, OrderBy, SharedStore, collections};

/// Live replica of the product catalog.
#[derive(Debug)]
pub struct Catalog {
    mirror: Mirror<Product>,
}

impl Catalog {
    /// Open the catalog mirror.
    #[must_use]
    pub fn open(store: SharedStore) -> Self {
        let mirror = Mirror::open(
            store,
            collections::PRODUCTS,
            MirrorOptions {
                order_by: OrderBy::asc("createdAt"),
                newest_first: true,
            },
        );
        Self { mirror }
    }

    /// Current replica state, newest product first.
    #[must_use]
    pub fn state(&self) -> MirrorState<Product> {
        self.mirror.state()
    }

    /// Watch the replica for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MirrorState<Product>> {
        self.mirror.watch()
    }

    /// Wait for the initial snapshot, returning the state at that point.
    pub async fn wait_loaded(&self) -> MirrorState<Product> {
        self.mirror.wait_loaded().await
    }

    /// Look up one product by id in the replica.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.mirror
            .state()
            .items
            .into_iter()
            .find(|product| &product.id == id)
    }

    /// Products in the given category, replica order preserved.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Product> {
        self.mirror
            .state()
            .items
            .into_iter()
            .filter(|product| product.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Case-insensitive substring search over product names.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.mirror.state().items;
        }
        self.mirror
            .state()
            .items
            .into_iter()
            .filter(|product| product.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Tear the mirror down, cancelling its subscription.
    pub fn shutdown(&self) {
        self.mirror.shutdown();
    }
}
