//! Checkout: turn the current cart into an immutable order snapshot.
//!
//! The order id is minted before the write and the write is create-only,
//! so resubmitting after an ambiguous failure can never produce a second
//! order: a create that loses to an existing document is the earlier
//! attempt having succeeded.

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use voltlane_core::models::{AddressInfo, Order};
use voltlane_core::types::{Email, OrderId, OrderStatus, UserId};
use voltlane_remote::{Notifier, RemoteError, SharedStore, collections, server_timestamp};

use crate::cart::CartSync;
use crate::error::AppError;
use crate::navigate::{Navigator, Route};
use crate::session::{Profile, SessionState};

/// Mint an order id ahead of submission.
///
/// Callers hold onto the id across retries of the same checkout attempt;
/// a fresh id means a fresh order.
#[must_use]
pub fn generate_order_id() -> OrderId {
    OrderId::new(Uuid::new_v4().to_string())
}

/// Submits orders and drives the post-checkout redirect.
pub struct CheckoutService {
    store: SharedStore,
    notifier: Notifier,
    navigator: Navigator,
    redirect_delay: std::time::Duration,
}

impl CheckoutService {
    /// Create the checkout service.
    #[must_use]
    pub const fn new(
        store: SharedStore,
        notifier: Notifier,
        navigator: Navigator,
        redirect_delay: std::time::Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            navigator,
            redirect_delay,
        }
    }

    /// Submit the current cart as an order.
    ///
    /// Validates the address, snapshots the cart deeply into the order
    /// document, writes it create-only under `order_id`, then clears the
    /// cart, toasts, and schedules the redirect to the dashboard.
    ///
    /// A submit that finds `order_id` already written is treated as a
    /// retry of a successful attempt and completes normally.
    ///
    /// # Errors
    ///
    /// Validation failures return without touching the service; a failed
    /// write is toasted and returned as [`AppError::Remote`].
    #[instrument(skip_all, fields(order_id = %order_id))]
    pub async fn submit_order(
        &self,
        cart: &CartSync,
        session: &SessionState,
        address: &AddressInfo,
        order_id: OrderId,
    ) -> Result<OrderId, AppError> {
        address.validate()?;
        let (user_uid, email) = buyer_identity(session)?;

        let cart_items = cart.state().items;
        if cart_items.is_empty() {
            return Err(AppError::EmptyCart);
        }

        // `time` here is a local placeholder; the stored document carries
        // the server-assigned commit time instead (see `order_payload`).
        let order = Order {
            id: order_id.clone(),
            cart_items,
            address_info: address.clone(),
            email,
            user_uid,
            status: OrderStatus::default(),
            time: Utc::now(),
        };

        match self
            .store
            .set_versioned(
                collections::ORDERS,
                order_id.as_str(),
                order_payload(&order),
                None,
            )
            .await
        {
            Ok(_) => {
                info!(total = %order.total(), "order placed");
            }
            Err(RemoteError::VersionConflict { .. }) => {
                // The earlier attempt landed; finish as if this one did.
                warn!("order already recorded; treating resubmit as success");
            }
            Err(err) => {
                error!(error = %err, "order submission failed");
                self.notifier.error("Error while placing the order");
                return Err(err.into());
            }
        }

        cart.clear().await;
        self.notifier.success("Order successfully placed");
        self.schedule_redirect();
        Ok(order_id)
    }

    /// Send the user to their dashboard after a short confirmation pause.
    fn schedule_redirect(&self) {
        let navigator = self.navigator.clone();
        let delay = self.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.go(Route::UserDashboard);
        });
    }
}

/// The uid and email the order is recorded against.
fn buyer_identity(session: &SessionState) -> Result<(UserId, Email), AppError> {
    match &session.profile {
        Profile::Known(user) => Ok((user.id.clone(), user.email.clone())),
        Profile::Missing {
            uid,
            email: Some(email),
        } => Ok((uid.clone(), email.clone())),
        Profile::Missing { email: None, .. } | Profile::Anonymous => Err(AppError::NotSignedIn),
    }
}

/// Serialize an order for storage: drop the id the key already carries
/// and hand `time` to the service as a sentinel resolved at commit.
fn order_payload(order: &Order) -> Value {
    let mut value = serde_json::to_value(order).unwrap_or(Value::Null);
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
        map.insert("time".to_owned(), server_timestamp());
    }
    value
}
