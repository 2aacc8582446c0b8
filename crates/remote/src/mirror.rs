//! Generic standing-subscription replica of a remote collection.
//!
//! A [`Mirror`] opens exactly one subscription for its lifetime, decodes
//! every pushed snapshot into typed models, and republishes the result on
//! a watch channel. The storefront catalog and the admin order/user/
//! newsletter views are all instances of this one mechanism.

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::store::SharedStore;
use crate::types::{OrderBy, QuerySnapshot};

/// Replica state published by a [`Mirror`].
///
/// `loaded` stays false until the first snapshot (or the first
/// subscription error) arrives, so consumers can distinguish "no items
/// yet" from "zero items".
#[derive(Debug, Clone)]
pub struct MirrorState<T> {
    /// Decoded items in display order.
    pub items: Vec<T>,
    /// Whether an initial snapshot attempt has completed.
    pub loaded: bool,
}

impl<T> Default for MirrorState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
        }
    }
}

/// Configuration for a [`Mirror`].
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Ordering requested from the remote service.
    pub order_by: OrderBy,
    /// Reverse each snapshot before publishing (newest-first display).
    pub newest_first: bool,
}

/// Live local replica of one remote collection.
///
/// Dropping the mirror (or calling [`Mirror::shutdown`]) aborts the pump
/// task, which cancels the underlying subscription. Leaving this to leak
/// would hold a live push channel per instantiation.
#[derive(Debug)]
pub struct Mirror<T> {
    rx: watch::Receiver<MirrorState<T>>,
    pump: JoinHandle<()>,
}

impl<T> Mirror<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Open a mirror of `collection`.
    ///
    /// The subscription is established by a background pump task; consume
    /// [`Mirror::watch`] or [`Mirror::wait_loaded`] to observe it.
    #[must_use]
    pub fn open(store: SharedStore, collection: &'static str, options: MirrorOptions) -> Self {
        let (tx, rx) = watch::channel(MirrorState::default());
        let pump = tokio::spawn(pump(store, collection, options, tx));
        Self { rx, pump }
    }

    /// The current replica state.
    #[must_use]
    pub fn state(&self) -> MirrorState<T> {
        self.rx.borrow().clone()
    }

    /// Watch the replica for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MirrorState<T>> {
        self.rx.clone()
    }

    /// Wait until the initial snapshot attempt has completed, returning
    /// the state at that point.
    pub async fn wait_loaded(&self) -> MirrorState<T> {
        let mut rx = self.rx.clone();
        match rx.wait_for(|state| state.loaded).await {
            Ok(state) => state.clone(),
            // Pump gone; whatever was last published is all there is.
            Err(_) => self.rx.borrow().clone(),
        }
    }

    /// Tear the mirror down, cancelling its subscription.
    pub fn shutdown(&self) {
        self.pump.abort();
    }
}

impl<T> Drop for Mirror<T> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump<T>(
    store: SharedStore,
    collection: &'static str,
    options: MirrorOptions,
    tx: watch::Sender<MirrorState<T>>,
) where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let mut sub = match store.subscribe(collection, options.order_by.clone()).await {
        Ok(sub) => sub,
        Err(err) => {
            // No retry here; the backend's own reconnection (if any) is
            // what we rely on. Mark loaded so the UI stops gating.
            error!(collection, error = %err, "failed to open mirror subscription");
            tx.send_modify(|state| state.loaded = true);
            return;
        }
    };

    debug!(collection, "mirror subscription established");
    loop {
        let snapshot = sub.snapshot();
        publish(collection, &options, &snapshot, &tx);
        if tx.is_closed() {
            return;
        }
        if let Err(err) = sub.changed().await {
            error!(collection, error = %err, "mirror subscription ended");
            tx.send_modify(|state| state.loaded = true);
            return;
        }
    }
}

fn publish<T>(
    collection: &'static str,
    options: &MirrorOptions,
    snapshot: &QuerySnapshot,
    tx: &watch::Sender<MirrorState<T>>,
) where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let mut items: Vec<T> = snapshot
        .docs
        .iter()
        .filter_map(|doc| match doc.decode::<T>(collection) {
            Ok(item) => Some(item),
            Err(err) => {
                // One malformed document must not poison the replica.
                warn!(collection, id = %doc.id, error = %err, "skipping undecodable document");
                None
            }
        })
        .collect();

    if options.newest_first {
        items.reverse();
    }

    let _ = tx.send(MirrorState {
        items,
        loaded: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRemote;
    use crate::store::DocumentStore;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Clone, Deserialize)]
    struct Entry {
        id: String,
    }

    fn options() -> MirrorOptions {
        MirrorOptions {
            order_by: OrderBy::asc("createdAt"),
            newest_first: true,
        }
    }

    #[tokio::test]
    async fn publishes_newest_first_and_tracks_changes() {
        let remote = MemoryRemote::new();
        for (id, ts) in [("a", "2026-01-01"), ("b", "2026-01-02")] {
            remote
                .set("entries", id, json!({ "createdAt": ts }))
                .await
                .expect("seed");
        }

        let store: SharedStore = Arc::new(remote.clone());
        let mirror: Mirror<Entry> = Mirror::open(store, "entries", options());
        let state = mirror.wait_loaded().await;
        let ids: Vec<_> = state.items.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["b".to_owned(), "a".to_owned()]);

        remote
            .set("entries", "c", json!({ "createdAt": "2026-01-03" }))
            .await
            .expect("insert");
        let mut rx = mirror.watch();
        let state = rx
            .wait_for(|s| s.items.len() == 3)
            .await
            .expect("mirror update");
        assert_eq!(state.items.first().map(|e| e.id.as_str()), Some("c"));
    }

    #[tokio::test]
    async fn malformed_documents_are_skipped() {
        let remote = MemoryRemote::new();
        remote
            .set("entries", "good", json!({ "createdAt": "2026-01-01" }))
            .await
            .expect("seed");
        remote
            .set("entries", "bad", json!(42))
            .await
            .expect("seed bad");

        let store: SharedStore = Arc::new(remote);
        let mirror: Mirror<Entry> = Mirror::open(store, "entries", options());
        let state = mirror.wait_loaded().await;
        assert_eq!(state.items.len(), 1);
    }

    #[tokio::test]
    async fn failed_subscription_still_marks_loaded() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);

        let store: SharedStore = Arc::new(remote);
        let mirror: Mirror<Entry> = Mirror::open(store, "entries", options());
        let state = mirror.wait_loaded().await;
        assert!(state.loaded);
        assert!(state.items.is_empty());
    }
}
