//! Cart synchronizer: local cart state persisted per-user.
//!
//! The cart is device-local until a session attaches, then mirrored into
//! `carts/{uid}` with compare-and-swap writes. Hydration runs through an
//! explicit phase machine: anything added before the remote cart arrives
//! is replaced by it, matching the remote document as the source of truth
//! for a signed-in user.
//!
//! Persistence failures are logged, never toasted; the local cart stays
//! authoritative for the UI and the next mutation retries the write.

use serde::Deserialize;
use serde_json::json;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, instrument, warn};

use voltlane_core::models::{CartItem, Product};
use voltlane_core::types::{Price, ProductId, UserId};
use voltlane_remote::{RemoteError, SharedStore, collections};

/// Hydration phase of the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    /// No session attached; mutations are local-only.
    Uninitialized,
    /// Session attached, remote cart fetch in flight.
    Hydrating,
    /// Remote cart adopted; mutations persist.
    Ready,
}

/// Cart state published to the UI.
#[derive(Debug, Clone)]
pub struct CartState {
    /// Line items in insertion order.
    pub items: Vec<CartItem>,
    /// Where the cart is in its hydration lifecycle.
    pub phase: CartPhase,
}

impl CartState {
    /// Total unit count across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .fold(Price::ZERO, |acc, item| acc.plus(item.line_total()))
    }
}

/// Stored shape of a `carts/{uid}` document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartDoc {
    #[serde(default)]
    cart_items: Vec<CartItem>,
}

#[derive(Debug)]
struct Inner {
    user: Option<UserId>,
    /// Version of the last adopted or written `carts/{uid}` revision.
    version: Option<u64>,
    items: Vec<CartItem>,
    phase: CartPhase,
}

/// The cart synchronizer.
///
/// All mutations serialize on an internal lock, including hydration, so a
/// mutation issued mid-hydration applies on top of the adopted remote
/// state rather than racing it.
pub struct CartSync {
    store: SharedStore,
    inner: Mutex<Inner>,
    tx: watch::Sender<CartState>,
}

impl CartSync {
    /// Write attempts per mutation before giving up until the next one.
    const PERSIST_ATTEMPTS: u32 = 2;

    /// Create a detached cart.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        let (tx, _) = watch::channel(CartState {
            items: Vec::new(),
            phase: CartPhase::Uninitialized,
        });
        Self {
            store,
            inner: Mutex::new(Inner {
                user: None,
                version: None,
                items: Vec::new(),
                phase: CartPhase::Uninitialized,
            }),
            tx,
        }
    }

    /// The current cart state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.tx.borrow().clone()
    }

    /// Watch the cart for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<CartState> {
        self.tx.subscribe()
    }

    /// Attach a session and hydrate from `carts/{uid}`.
    ///
    /// The remote cart replaces whatever was in the local cart; an absent
    /// document hydrates to empty. A fetch failure leaves the cart ready
    /// with its local items and no adopted version, so the next mutation
    /// resolves the conflict through the versioned write path.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn attach(&self, uid: UserId) {
        let mut inner = self.inner.lock().await;
        inner.user = Some(uid.clone());
        inner.phase = CartPhase::Hydrating;
        self.publish(&inner);

        match self.store.get(collections::CARTS, uid.as_str()).await {
            Ok(Some(doc)) => match doc.decode::<CartDoc>(collections::CARTS) {
                Ok(cart) => {
                    inner.items = cart.cart_items;
                    inner.version = Some(doc.version);
                }
                Err(err) => {
                    error!(error = %err, "cart document failed to decode; starting empty");
                    inner.items = Vec::new();
                    inner.version = Some(doc.version);
                }
            },
            Ok(None) => {
                inner.items = Vec::new();
                inner.version = None;
            }
            Err(err) => {
                warn!(error = %err, "cart hydration failed; keeping local items");
                inner.version = None;
            }
        }
        inner.phase = CartPhase::Ready;
        debug!(items = inner.items.len(), "cart hydrated");
        self.publish(&inner);
    }

    /// Detach the session. The local cart is cleared; nothing is written.
    pub async fn detach(&self) {
        let mut inner = self.inner.lock().await;
        inner.user = None;
        inner.version = None;
        inner.items.clear();
        inner.phase = CartPhase::Uninitialized;
        self.publish(&inner);
    }

    /// Add one unit of `product`, merging with an existing line.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: Product) {
        let mut inner = self.inner.lock().await;
        if let Some(item) = inner
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            inner.items.push(CartItem::new(product));
        }
        self.publish(&inner);
        self.persist(&mut inner).await;
    }

    /// Increment a line's quantity. No-op when the line is absent.
    #[instrument(skip(self))]
    pub async fn increment(&self, product_id: &ProductId) {
        let mut inner = self.inner.lock().await;
        let Some(item) = inner.items.iter_mut().find(|item| &item.product.id == product_id)
        else {
            return;
        };
        item.quantity = item.quantity.saturating_add(1);
        self.publish(&inner);
        self.persist(&mut inner).await;
    }

    /// Decrement a line's quantity, floored at one unit. Removing a line
    /// entirely goes through [`CartSync::remove`].
    #[instrument(skip(self))]
    pub async fn decrement(&self, product_id: &ProductId) {
        let mut inner = self.inner.lock().await;
        let Some(item) = inner.items.iter_mut().find(|item| &item.product.id == product_id)
        else {
            return;
        };
        if item.quantity <= 1 {
            return;
        }
        item.quantity -= 1;
        self.publish(&inner);
        self.persist(&mut inner).await;
    }

    /// Remove a line. No-op when the line is absent.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: &ProductId) {
        let mut inner = self.inner.lock().await;
        let before = inner.items.len();
        inner.items.retain(|item| &item.product.id != product_id);
        if inner.items.len() == before {
            return;
        }
        self.publish(&inner);
        self.persist(&mut inner).await;
    }

    /// Empty the cart, persisting the empty list for an attached session.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        if inner.items.is_empty() {
            return;
        }
        inner.items.clear();
        self.publish(&inner);
        self.persist(&mut inner).await;
    }

    fn publish(&self, inner: &Inner) {
        let _ = self.tx.send(CartState {
            items: inner.items.clone(),
            phase: inner.phase,
        });
    }

    /// Write the local cart through the versioned path.
    ///
    /// On a version conflict the local list stays authoritative: the write
    /// is retried against the version the service reported. After the
    /// attempt budget the failure is logged and the cart left dirty for
    /// the next mutation to flush.
    async fn persist(&self, inner: &mut Inner) {
        let Some(uid) = inner.user.clone() else {
            return;
        };
        if inner.phase != CartPhase::Ready {
            return;
        }
        let payload = json!({ "cartItems": inner.items });

        for attempt in 1..=Self::PERSIST_ATTEMPTS {
            match self
                .store
                .set_versioned(
                    collections::CARTS,
                    uid.as_str(),
                    payload.clone(),
                    inner.version,
                )
                .await
            {
                Ok(version) => {
                    inner.version = Some(version);
                    return;
                }
                Err(RemoteError::VersionConflict { actual, .. }) => {
                    debug!(attempt, ?actual, "cart write lost a version race; retrying");
                    inner.version = actual;
                }
                Err(err) => {
                    error!(error = %err, "cart write failed");
                    return;
                }
            }
        }
        error!(uid = %uid, "cart write kept conflicting; leaving dirty");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use voltlane_remote::DocumentStore;
    use voltlane_remote::memory::MemoryRemote;

    fn product(id: &str, name: &str) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "price": "99.00",
            "category": "audio",
            "imageURL": "https://img.voltlane.dev/p.webp",
            "createdAt": "2026-01-01T00:00:00Z",
        }))
        .expect("product")
    }

    async fn stored_quantities(remote: &MemoryRemote, uid: &str) -> Vec<(String, u32)> {
        let doc = remote
            .get(collections::CARTS, uid)
            .await
            .expect("get cart")
            .expect("cart exists");
        let cart: CartDoc = doc.decode(collections::CARTS).expect("decode");
        cart.cart_items
            .into_iter()
            .map(|item| (item.product.id.to_string(), item.quantity))
            .collect()
    }

    #[tokio::test]
    async fn mutations_persist_for_an_attached_session() {
        let remote = MemoryRemote::new();
        let cart = CartSync::new(Arc::new(remote.clone()));
        cart.attach(UserId::from("u-1")).await;

        cart.add(product("p-1", "Earbuds")).await;
        cart.add(product("p-1", "Earbuds")).await;
        cart.add(product("p-2", "Soundbar")).await;
        cart.decrement(&ProductId::from("p-2")).await; // floored at 1

        assert_eq!(
            stored_quantities(&remote, "u-1").await,
            vec![("p-1".to_owned(), 2), ("p-2".to_owned(), 1)]
        );
        assert_eq!(cart.state().count(), 3);
    }

    #[tokio::test]
    async fn hydration_replaces_local_items() {
        let remote = MemoryRemote::new();
        remote
            .set(
                collections::CARTS,
                "u-1",
                json!({ "cartItems": [{
                    "id": "p-9",
                    "name": "Dock",
                    "price": "49.00",
                    "category": "accessories",
                    "imageURL": "https://img.voltlane.dev/d.webp",
                    "createdAt": "2026-01-01T00:00:00Z",
                    "quantity": 4,
                }]}),
            )
            .await
            .expect("seed cart");

        let cart = CartSync::new(Arc::new(remote));
        cart.add(product("p-1", "Earbuds")).await; // anonymous, local-only
        cart.attach(UserId::from("u-1")).await;

        let state = cart.state();
        assert_eq!(state.phase, CartPhase::Ready);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items.first().map(|i| i.quantity), Some(4));
    }

    #[tokio::test]
    async fn version_races_retry_with_the_local_list() {
        let remote = MemoryRemote::new();
        let cart = CartSync::new(Arc::new(remote.clone()));
        cart.attach(UserId::from("u-1")).await;
        cart.add(product("p-1", "Earbuds")).await;

        // Foreign write bumps the stored version behind our back.
        remote
            .set(collections::CARTS, "u-1", json!({ "cartItems": [] }))
            .await
            .expect("foreign write");

        cart.add(product("p-2", "Soundbar")).await;
        assert_eq!(
            stored_quantities(&remote, "u-1").await,
            vec![("p-1".to_owned(), 1), ("p-2".to_owned(), 1)]
        );
    }

    #[tokio::test]
    async fn detach_clears_without_writing() {
        let remote = MemoryRemote::new();
        let cart = CartSync::new(Arc::new(remote.clone()));
        cart.attach(UserId::from("u-1")).await;
        cart.add(product("p-1", "Earbuds")).await;
        cart.detach().await;

        assert_eq!(cart.state().phase, CartPhase::Uninitialized);
        assert!(cart.state().items.is_empty());
        // The persisted cart is untouched by the detach itself.
        assert_eq!(
            stored_quantities(&remote, "u-1").await,
            vec![("p-1".to_owned(), 1)]
        );
    }

    #[tokio::test]
    async fn anonymous_mutations_never_touch_the_store() {
        let remote = MemoryRemote::new();
        let cart = CartSync::new(Arc::new(remote.clone()));
        cart.add(product("p-1", "Earbuds")).await;

        assert!(
            remote
                .get(collections::CARTS, "u-1")
                .await
                .expect("get")
                .is_none()
        );
        assert_eq!(cart.state().count(), 1);
    }
}
