//! Application state: one struct wiring every storefront component.
//!
//! [`StorefrontApp::start`] boots the session store, catalog mirror, cart
//! synchronizer, and favorites worker, plus a bridge task that translates
//! session transitions into cart attach/detach and favorites
//! hydrate/reset. The UI holds the app and the route receiver; everything
//! else is reachable through accessors.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use voltlane_core::types::UserId;
use voltlane_remote::{Notifier, SharedAuth, SharedStore};

use crate::auth::AuthService;
use crate::cart::CartSync;
use crate::catalog::Catalog;
use crate::checkout::CheckoutService;
use crate::favorites::FavoritesSync;
use crate::navigate::{Navigator, Route};
use crate::newsletter::NewsletterService;
use crate::session::{Profile, SessionStore};

/// The assembled storefront state layer.
pub struct StorefrontApp {
    notifier: Notifier,
    session: SessionStore,
    catalog: Catalog,
    cart: Arc<CartSync>,
    favorites: Arc<FavoritesSync>,
    checkout: CheckoutService,
    newsletter: NewsletterService,
    auth: AuthService,
    bridge: JoinHandle<()>,
}

impl StorefrontApp {
    /// Boot the state layer against the given backends.
    ///
    /// Returns the app and the navigation receiver the UI shell drains.
    #[must_use]
    pub fn start(
        store: SharedStore,
        auth_gateway: SharedAuth,
        redirect_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Route>) {
        let notifier = Notifier::new();
        let (navigator, routes) = Navigator::channel();

        let session = SessionStore::start(
            Arc::clone(&store),
            Arc::clone(&auth_gateway),
            notifier.clone(),
        );
        let catalog = Catalog::open(Arc::clone(&store));
        let cart = Arc::new(CartSync::new(Arc::clone(&store)));
        let favorites = Arc::new(FavoritesSync::start(
            Arc::clone(&store),
            notifier.clone(),
        ));
        let checkout = CheckoutService::new(
            Arc::clone(&store),
            notifier.clone(),
            navigator.clone(),
            redirect_delay,
        );
        let newsletter = NewsletterService::new(Arc::clone(&store), notifier.clone());
        let auth = AuthService::new(
            Arc::clone(&store),
            Arc::clone(&auth_gateway),
            notifier.clone(),
            navigator,
        );

        let bridge = tokio::spawn(bridge_session(
            session.watch(),
            Arc::clone(&cart),
            Arc::clone(&favorites),
        ));

        info!("storefront state layer started");
        let app = Self {
            notifier,
            session,
            catalog,
            cart,
            favorites,
            checkout,
            newsletter,
            auth,
            bridge,
        };
        (app, routes)
    }

    /// Toast stream handle.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Product catalog replica.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cart synchronizer.
    #[must_use]
    pub fn cart(&self) -> &CartSync {
        &self.cart
    }

    /// Favorites synchronizer.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesSync {
        &self.favorites
    }

    /// Checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }

    /// Newsletter service.
    #[must_use]
    pub fn newsletter(&self) -> &NewsletterService {
        &self.newsletter
    }

    /// Account flows.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Tear the whole state layer down.
    pub fn shutdown(&self) {
        self.bridge.abort();
        self.session.shutdown();
        self.catalog.shutdown();
        self.favorites.shutdown();
    }
}

impl Drop for StorefrontApp {
    fn drop(&mut self) {
        self.bridge.abort();
    }
}

/// Translate session transitions into cart and favorites lifecycle calls.
async fn bridge_session(
    mut session_rx: tokio::sync::watch::Receiver<crate::session::SessionState>,
    cart: Arc<CartSync>,
    favorites: Arc<FavoritesSync>,
) {
    let mut attached: Option<UserId> = None;
    loop {
        let state = session_rx.borrow_and_update().clone();
        if !state.loading {
            match &state.profile {
                Profile::Known(user) => {
                    if attached.as_ref() != Some(&user.id) {
                        debug!(uid = %user.id, "attaching cart and favorites");
                        cart.attach(user.id.clone()).await;
                        favorites.hydrate(user.id.clone(), user.favorites.clone());
                        attached = Some(user.id.clone());
                    }
                }
                Profile::Missing { uid, .. } => {
                    if attached.as_ref() != Some(uid) {
                        debug!(uid = %uid, "attaching cart for profile-less session");
                        cart.attach(uid.clone()).await;
                        favorites.hydrate(uid.clone(), Vec::new());
                        attached = Some(uid.clone());
                    }
                }
                Profile::Anonymous => {
                    if attached.take().is_some() {
                        debug!("detaching cart and favorites");
                        cart.detach().await;
                        favorites.reset();
                    }
                }
            }
        }
        if session_rx.changed().await.is_err() {
            return;
        }
    }
}
