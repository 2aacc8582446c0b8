//! Newsletter subscriber list, newest signup first.

use std::sync::Arc;

use tokio::sync::watch;

use voltlane_core::models::NewsletterSubscriber;
use voltlane_remote::{Mirror, MirrorOptions, MirrorState, OrderBy, SharedStore, collections};

/// Live subscriber list.
#[derive(Debug)]
pub struct NewsletterAdmin {
    mirror: Mirror<NewsletterSubscriber>,
}

impl NewsletterAdmin {
    /// Open the mirror, newest signup first.
    #[must_use]
    pub fn open(store: SharedStore) -> Self {
        let mirror = Mirror::open(
            Arc::clone(&store),
            collections::NEWSLETTER,
            MirrorOptions {
                order_by: OrderBy::desc("createdAt"),
                newest_first: false,
            },
        );
        Self { mirror }
    }

    /// Current subscriber list.
    #[must_use]
    pub fn state(&self) -> MirrorState<NewsletterSubscriber> {
        self.mirror.state()
    }

    /// Watch the subscriber list for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MirrorState<NewsletterSubscriber>> {
        self.mirror.watch()
    }

    /// Wait for the initial snapshot.
    pub async fn wait_loaded(&self) -> MirrorState<NewsletterSubscriber> {
        self.mirror.wait_loaded().await
    }

    /// Tear down the mirror.
    pub fn shutdown(&self) {
        self.mirror.shutdown();
    }
}
