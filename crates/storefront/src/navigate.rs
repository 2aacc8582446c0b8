//! Navigation requests emitted by state-layer flows.
//!
//! Some flows end by sending the user somewhere (login after registration,
//! the dashboard after checkout). The state layer never renders; it pushes
//! [`Route`] values onto a channel that the UI shell drains.

use tokio::sync::mpsc;
use tracing::debug;

/// Destinations a flow can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Storefront landing page.
    Home,
    /// Login form.
    Login,
    /// Password-reset request form.
    ForgotPassword,
    /// Signed-in customer dashboard (orders, favorites).
    UserDashboard,
    /// Admin dashboard.
    AdminDashboard,
}

/// Emitting half of the navigation channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl Navigator {
    /// Create a navigator and the receiver the UI shell drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Request navigation to `route`. A request with no UI attached is
    /// silently dropped.
    pub fn go(&self, route: Route) {
        debug!(?route, "navigation requested");
        let _ = self.tx.send(route);
    }
}
