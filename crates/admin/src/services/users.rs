//! Customer list, read-only.
//!
//! Accounts live in the identity provider; destroying one from the
//! dashboard would orphan it, so the users view only observes.

use std::sync::Arc;

use tokio::sync::watch;

use voltlane_core::models::User;
use voltlane_remote::{Mirror, MirrorOptions, MirrorState, OrderBy, SharedStore, collections};

/// Live customer list.
#[derive(Debug)]
pub struct UserAdmin {
    mirror: Mirror<User>,
}

impl UserAdmin {
    /// Open the mirror, ordered by signup time.
    #[must_use]
    pub fn open(store: SharedStore) -> Self {
        let mirror = Mirror::open(
            Arc::clone(&store),
            collections::USERS,
            MirrorOptions {
                order_by: OrderBy::asc("createdAt"),
                newest_first: false,
            },
        );
        Self { mirror }
    }

    /// Current customer list.
    #[must_use]
    pub fn state(&self) -> MirrorState<User> {
        self.mirror.state()
    }

    /// Watch the customer list for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MirrorState<User>> {
        self.mirror.watch()
    }

    /// Wait for the initial snapshot.
    pub async fn wait_loaded(&self) -> MirrorState<User> {
        self.mirror.wait_loaded().await
    }

    /// Tear down the mirror.
    pub fn shutdown(&self) {
        self.mirror.shutdown();
    }
}
