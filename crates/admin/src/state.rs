//! Dashboard state: services assembled behind the role gate.

use std::sync::Arc;

use tracing::info;

use voltlane_remote::{Notifier, SharedStore};
use voltlane_storefront::{Navigator, session::SessionState};

use crate::access::require_admin;
use crate::error::AdminError;
use crate::services::{NewsletterAdmin, OrderAdmin, ProductAdmin, UserAdmin};

/// The assembled dashboard state layer.
pub struct AdminApp {
    products: ProductAdmin,
    orders: OrderAdmin,
    users: UserAdmin,
    newsletter: NewsletterAdmin,
}

impl std::fmt::Debug for AdminApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApp").finish_non_exhaustive()
    }
}

impl AdminApp {
    /// Boot the dashboard for an already-resolved session.
    ///
    /// The mirrors only open after the role gate passes, so a non-admin
    /// session never holds standing subscriptions to the management views.
    ///
    /// # Errors
    ///
    /// [`AdminError::Forbidden`] unless the session is a resolved admin.
    pub fn start(
        store: SharedStore,
        session: &SessionState,
        notifier: Notifier,
        navigator: Navigator,
    ) -> Result<Self, AdminError> {
        require_admin(session)?;

        let products = ProductAdmin::open(Arc::clone(&store), notifier.clone(), navigator);
        let orders = OrderAdmin::open(Arc::clone(&store), notifier);
        let users = UserAdmin::open(Arc::clone(&store));
        let newsletter = NewsletterAdmin::open(store);

        info!("admin dashboard started");
        Ok(Self {
            products,
            orders,
            users,
            newsletter,
        })
    }

    /// Product management.
    #[must_use]
    pub fn products(&self) -> &ProductAdmin {
        &self.products
    }

    /// Order management.
    #[must_use]
    pub fn orders(&self) -> &OrderAdmin {
        &self.orders
    }

    /// Customer list.
    #[must_use]
    pub fn users(&self) -> &UserAdmin {
        &self.users
    }

    /// Subscriber list.
    #[must_use]
    pub fn newsletter(&self) -> &NewsletterAdmin {
        &self.newsletter
    }

    /// Tear every mirror down.
    pub fn shutdown(&self) {
        self.products.shutdown();
        self.orders.shutdown();
        self.users.shutdown();
        self.newsletter.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use voltlane_core::models::User;
    use voltlane_remote::memory::MemoryRemote;
    use voltlane_storefront::session::Profile;

    fn admin_session() -> SessionState {
        let user: User = serde_json::from_value(json!({
            "id": "u-1",
            "fullName": "Root",
            "email": "root@voltlane.dev",
            "role": "admin",
            "createdAt": "2026-01-01T00:00:00Z",
        }))
        .expect("user");
        SessionState {
            profile: Profile::Known(user),
            loading: false,
        }
    }

    #[tokio::test]
    async fn non_admin_sessions_cannot_boot_the_dashboard() {
        let remote = MemoryRemote::new();
        let (navigator, _routes) = Navigator::channel();
        let anonymous = SessionState {
            profile: Profile::Anonymous,
            loading: false,
        };
        let err = AdminApp::start(Arc::new(remote), &anonymous, Notifier::new(), navigator)
            .expect_err("must reject");
        assert!(matches!(err, AdminError::Forbidden));
    }

    #[tokio::test]
    async fn admin_sessions_get_live_views() {
        let remote = MemoryRemote::new();
        let (navigator, _routes) = Navigator::channel();
        let app = AdminApp::start(
            Arc::new(remote),
            &admin_session(),
            Notifier::new(),
            navigator,
        )
        .expect("boot");

        assert!(app.products().wait_loaded().await.items.is_empty());
        assert!(app.orders().wait_loaded().await.items.is_empty());
        app.shutdown();
    }
}
