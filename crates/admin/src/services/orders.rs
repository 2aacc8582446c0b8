//! Order management: live list plus delete.
//!
//! Orders are immutable snapshots; the dashboard only removes them.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, instrument};

use voltlane_core::models::Order;
use voltlane_core::types::OrderId;
use voltlane_remote::{
    Mirror, MirrorOptions, MirrorState, Notifier, OrderBy, SharedStore, collections,
};

use crate::error::AdminError;

/// Order list and removal.
pub struct OrderAdmin {
    store: SharedStore,
    notifier: Notifier,
    mirror: Mirror<Order>,
}

impl OrderAdmin {
    /// Open the service and its mirror, ordered by submission time.
    #[must_use]
    pub fn open(store: SharedStore, notifier: Notifier) -> Self {
        let mirror = Mirror::open(
            Arc::clone(&store),
            collections::ORDERS,
            MirrorOptions {
                order_by: OrderBy::asc("time"),
                newest_first: false,
            },
        );
        Self {
            store,
            notifier,
            mirror,
        }
    }

    /// Current order list, oldest first.
    #[must_use]
    pub fn state(&self) -> MirrorState<Order> {
        self.mirror.state()
    }

    /// Watch the order list for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MirrorState<Order>> {
        self.mirror.watch()
    }

    /// Wait for the initial snapshot.
    pub async fn wait_loaded(&self) -> MirrorState<Order> {
        self.mirror.wait_loaded().await
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// The write failure; logged but not toasted, matching the dashboard's
    /// silent handling of a failed row removal.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &OrderId) -> Result<(), AdminError> {
        match self.store.delete(collections::ORDERS, id.as_str()).await {
            Ok(()) => {
                info!("order deleted");
                self.notifier.success("Order deleted successfully");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "order delete failed");
                Err(err.into())
            }
        }
    }

    /// Tear down the mirror.
    pub fn shutdown(&self) {
        self.mirror.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use voltlane_remote::DocumentStore;
    use voltlane_remote::memory::MemoryRemote;

    async fn seed_order(remote: &MemoryRemote, id: &str, time: &str) {
        remote
            .set(
                collections::ORDERS,
                id,
                json!({
                    "cartItems": [],
                    "addressInfo": {
                        "name": "Ada Sparks",
                        "address": "12 Volt Street",
                        "zipCode": "94016",
                        "mobileNumber": "4155550123",
                    },
                    "email": "ada@example.com",
                    "userUid": "u-1",
                    "status": "confirmed",
                    "time": time,
                }),
            )
            .await
            .expect("seed order");
    }

    #[tokio::test]
    async fn orders_list_oldest_first_and_delete_toasts() {
        let remote = MemoryRemote::new();
        seed_order(&remote, "o-2", "2026-02-01T00:00:00Z").await;
        seed_order(&remote, "o-1", "2026-01-01T00:00:00Z").await;

        let notifier = Notifier::new();
        let mut toasts = notifier.subscribe();
        let admin = OrderAdmin::open(Arc::new(remote), notifier);

        let state = admin.wait_loaded().await;
        let ids: Vec<_> = state.items.iter().map(|o| o.id.to_string()).collect();
        assert_eq!(ids, vec!["o-1".to_owned(), "o-2".to_owned()]);

        admin.delete(&OrderId::from("o-1")).await.expect("delete");
        assert_eq!(
            toasts.recv().await.expect("toast").message,
            "Order deleted successfully"
        );
        let mut rx = admin.watch();
        rx.wait_for(|s| s.items.len() == 1).await.expect("removed");
    }
}
