//! Favorites synchronizer.
//!
//! Toggles are funneled through one worker task, so at most one
//! `users/{uid}` write is in flight at a time. Toggles that queue up while
//! a write is awaited are coalesced into the next one. Commits are not
//! optimistic: the published set only changes once the service accepts the
//! write, so a failed toggle leaves the heart exactly where it was.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use voltlane_core::types::{ProductId, UserId};
use voltlane_remote::{Notifier, SharedStore, collections};

/// Published favorites state.
#[derive(Debug, Clone, Default)]
pub struct FavoritesState {
    /// Favorited product ids, oldest first.
    pub items: Vec<ProductId>,
}

impl FavoritesState {
    /// Whether a product is currently favorited.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.contains(product_id)
    }
}

#[derive(Debug)]
enum Command {
    /// Adopt the favorites list from a freshly resolved profile.
    Hydrate {
        uid: UserId,
        favorites: Vec<ProductId>,
    },
    /// Session ended; drop uid and list.
    Reset,
    /// Flip one product's membership.
    Toggle(ProductId),
}

/// Handle to the favorites worker.
#[derive(Debug)]
pub struct FavoritesSync {
    tx: mpsc::UnboundedSender<Command>,
    rx: watch::Receiver<FavoritesState>,
    worker: JoinHandle<()>,
}

impl FavoritesSync {
    /// Start the worker task.
    #[must_use]
    pub fn start(store: SharedStore, notifier: Notifier) -> Self {
        let (tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, rx) = watch::channel(FavoritesState::default());
        let worker = tokio::spawn(run_worker(store, notifier, command_rx, state_tx));
        Self { tx, rx, worker }
    }

    /// The current favorites state.
    #[must_use]
    pub fn state(&self) -> FavoritesState {
        self.rx.borrow().clone()
    }

    /// Watch the favorites for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<FavoritesState> {
        self.rx.clone()
    }

    /// Adopt a profile's favorites list.
    pub fn hydrate(&self, uid: UserId, favorites: Vec<ProductId>) {
        let _ = self.tx.send(Command::Hydrate { uid, favorites });
    }

    /// Clear state on sign-out.
    pub fn reset(&self) {
        let _ = self.tx.send(Command::Reset);
    }

    /// Flip a product's favorite status. Ignored while signed out.
    pub fn toggle(&self, product_id: ProductId) {
        let _ = self.tx.send(Command::Toggle(product_id));
    }

    /// Tear the worker down. Queued toggles are dropped.
    pub fn shutdown(&self) {
        self.worker.abort();
    }
}

impl Drop for FavoritesSync {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct WorkerState {
    uid: Option<UserId>,
    items: Vec<ProductId>,
}

async fn run_worker(
    store: SharedStore,
    notifier: Notifier,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<FavoritesState>,
) {
    let mut state = WorkerState {
        uid: None,
        items: Vec::new(),
    };
    // A non-toggle command pulled out of a coalescing drain, handled on
    // the next iteration.
    let mut stashed: Option<Command> = None;

    loop {
        let command = match stashed.take() {
            Some(command) => command,
            None => match commands.recv().await {
                Some(command) => command,
                None => return,
            },
        };

        match command {
            Command::Hydrate { uid, favorites } => {
                state.uid = Some(uid);
                state.items = favorites;
                publish(&state_tx, &state);
            }
            Command::Reset => {
                state.uid = None;
                state.items.clear();
                publish(&state_tx, &state);
            }
            Command::Toggle(product_id) => {
                let Some(uid) = state.uid.clone() else {
                    debug!(%product_id, "toggle ignored while signed out");
                    continue;
                };

                let mut working = state.items.clone();
                flip(&mut working, product_id);
                // Coalesce everything already queued into this commit.
                loop {
                    match commands.try_recv() {
                        Ok(Command::Toggle(next)) => flip(&mut working, next),
                        Ok(other) => {
                            stashed = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }

                commit(&store, &notifier, &uid, &mut state, working, &state_tx).await;
            }
        }
    }
}

#[instrument(skip_all, fields(uid = %uid, count = working.len()))]
async fn commit(
    store: &SharedStore,
    notifier: &Notifier,
    uid: &UserId,
    state: &mut WorkerState,
    working: Vec<ProductId>,
    state_tx: &watch::Sender<FavoritesState>,
) {
    let mut fields = serde_json::Map::new();
    fields.insert(
        "favorites".to_owned(),
        serde_json::to_value(&working).unwrap_or_default(),
    );

    match store.update(collections::USERS, uid.as_str(), fields).await {
        Ok(()) => {
            state.items = working;
            publish(state_tx, state);
            notifier.success("Favorites updated");
        }
        Err(err) => {
            error!(error = %err, "favorites write failed; keeping previous list");
            notifier.error("Failed to update favorites");
        }
    }
}

fn flip(items: &mut Vec<ProductId>, product_id: ProductId) {
    if let Some(pos) = items.iter().position(|id| id == &product_id) {
        items.remove(pos);
    } else {
        items.push(product_id);
    }
}

fn publish(tx: &watch::Sender<FavoritesState>, state: &WorkerState) {
    let _ = tx.send(FavoritesState {
        items: state.items.clone(),
    });
}
