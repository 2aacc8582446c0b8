//! Integration tests for Voltlane.
//!
//! The whole storefront state layer runs in-process against
//! [`MemoryRemote`], so these tests exercise real hydration, versioned
//! writes, and the session bridge without a network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p voltlane-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use voltlane_core::types::Email;
use voltlane_remote::memory::MemoryRemote;
use voltlane_remote::{AuthGateway, DocumentStore, collections};
use voltlane_storefront::{CartPhase, Route, StorefrontApp};

/// Everything a scenario needs: the backend handle for seeding and
/// assertions, the booted app, and the navigation stream.
pub struct TestContext {
    pub remote: MemoryRemote,
    pub app: StorefrontApp,
    pub routes: mpsc::UnboundedReceiver<Route>,
}

impl TestContext {
    /// Redirect delay wired into checkout; pair with `start_paused` tests.
    pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

    /// Boot the storefront against a fresh in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        let remote = MemoryRemote::new();
        let (app, routes) = StorefrontApp::start(
            std::sync::Arc::new(remote.clone()),
            std::sync::Arc::new(remote.clone()),
            Self::REDIRECT_DELAY,
        );
        Self { remote, app, routes }
    }

    /// Seed one product document.
    pub async fn seed_product(&self, id: &str, name: &str, price: &str, created_at: &str) {
        self.remote
            .set(
                collections::PRODUCTS,
                id,
                json!({
                    "name": name,
                    "price": price,
                    "category": "audio",
                    "imageURL": format!("https://img.voltlane.dev/{id}.webp"),
                    "createdAt": created_at,
                }),
            )
            .await
            .expect("seed product");
    }

    /// Seed a customer: provider account plus profile document.
    pub async fn seed_customer(&self, uid: &str, email: &str, password: &str) {
        self.remote
            .register_account(uid, email, password)
            .expect("seed account");
        self.remote
            .set(
                collections::USERS,
                uid,
                json!({
                    "fullName": "Test Customer",
                    "email": email,
                    "role": "user",
                    "favorites": [],
                    "createdAt": "2026-01-01T00:00:00Z",
                }),
            )
            .await
            .expect("seed profile");
    }

    /// Sign in through the provider and wait until the bridge has attached
    /// the cart.
    pub async fn sign_in_and_wait(&self, email: &str, password: &str) {
        let email = Email::parse(email).expect("email");
        self.remote
            .sign_in_with_password(&email, password)
            .await
            .expect("sign in");
        let mut cart_rx = self.app.cart().watch();
        cart_rx
            .wait_for(|state| state.phase == CartPhase::Ready)
            .await
            .expect("cart hydrated");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
