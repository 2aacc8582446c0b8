//! Session store: identity provider state joined with the profile document.
//!
//! The store watches the provider's auth-state stream for its whole
//! lifetime. On every transition it resolves the principal to a
//! [`Profile`] by fetching `users/{uid}`, and republishes on a watch
//! channel. Consumers gate on [`SessionState::loading`] to avoid treating
//! "still resolving the restored session" as "signed out".

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use voltlane_core::models::User;
use voltlane_core::types::{Email, UserId};
use voltlane_remote::{Notifier, RemoteError, SharedAuth, SharedStore, collections};

use crate::error::AppError;

/// Resolved identity of the current session.
#[derive(Debug, Clone)]
pub enum Profile {
    /// No session.
    Anonymous,
    /// Authenticated, but no `users/{uid}` document exists (or it failed to
    /// decode). The session is real; profile-dependent features degrade.
    Missing {
        /// Auth uid of the session.
        uid: UserId,
        /// Email on the identity record, when known.
        email: Option<Email>,
    },
    /// Authenticated with a readable profile document.
    Known(User),
}

impl Profile {
    /// Auth uid, when a session exists.
    #[must_use]
    pub fn uid(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Missing { uid, .. } => Some(uid),
            Self::Known(user) => Some(&user.id),
        }
    }

    /// Whether the resolved profile carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Known(user) if user.is_admin())
    }
}

/// State published by the session store.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Resolved identity.
    pub profile: Profile,
    /// True until the first auth-state resolution completes. A restored
    /// session looks signed-out for a moment; consumers must not redirect
    /// or render "logged out" UI while this holds.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            profile: Profile::Anonymous,
            loading: true,
        }
    }
}

/// Watches auth state and publishes the resolved session.
pub struct SessionStore {
    auth: SharedAuth,
    notifier: Notifier,
    rx: watch::Receiver<SessionState>,
    watcher: JoinHandle<()>,
}

impl SessionStore {
    /// Start the session store. The watcher task runs until the store is
    /// dropped or the provider's auth channel closes.
    #[must_use]
    pub fn start(store: SharedStore, auth: SharedAuth, notifier: Notifier) -> Self {
        let (tx, rx) = watch::channel(SessionState::default());
        let auth_rx = auth.auth_state();
        let watcher = tokio::spawn(watch_auth(store, auth_rx, tx));
        Self {
            auth,
            notifier,
            rx,
            watcher,
        }
    }

    /// The current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Watch the session for changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.rx.clone()
    }

    /// Wait until the first auth-state resolution has completed.
    pub async fn wait_ready(&self) -> SessionState {
        let mut rx = self.rx.clone();
        match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.rx.borrow().clone(),
        }
    }

    /// End the current session.
    ///
    /// The outcome is surfaced as a toast either way; the auth-state stream
    /// drives the actual transition to [`Profile::Anonymous`].
    ///
    /// # Errors
    ///
    /// Propagates the provider failure after toasting it.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AppError> {
        match self.auth.sign_out().await {
            Ok(()) => {
                info!("session signed out");
                self.notifier.success("Logout Successful");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "sign-out failed");
                self.notifier.error("Something went wrong while logging out");
                Err(err.into())
            }
        }
    }

    /// Tear the store down, ending the watcher task.
    pub fn shutdown(&self) {
        self.watcher.abort();
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

async fn watch_auth(
    store: SharedStore,
    mut auth_rx: watch::Receiver<Option<voltlane_remote::Principal>>,
    tx: watch::Sender<SessionState>,
) {
    loop {
        let principal = auth_rx.borrow_and_update().clone();
        let profile = match principal {
            None => Profile::Anonymous,
            Some(principal) => resolve_profile(&store, principal).await,
        };
        debug!(signed_in = profile.uid().is_some(), "session resolved");
        if tx
            .send(SessionState {
                profile,
                loading: false,
            })
            .is_err()
        {
            return;
        }
        if auth_rx.changed().await.is_err() {
            return;
        }
    }
}

/// Resolve a principal to a profile by reading `users/{uid}`.
///
/// A missing or unreadable document never downgrades the session to
/// anonymous; it resolves to [`Profile::Missing`] so callers can tell the
/// difference.
async fn resolve_profile(store: &SharedStore, principal: voltlane_remote::Principal) -> Profile {
    let uid = principal.uid.clone();
    match store.get(collections::USERS, uid.as_str()).await {
        Ok(Some(doc)) => match doc.decode::<User>(collections::USERS) {
            Ok(user) => Profile::Known(user),
            Err(err) => {
                error!(uid = %uid, error = %err, "profile document failed to decode");
                Profile::Missing {
                    uid,
                    email: principal.email,
                }
            }
        },
        Ok(None) => {
            debug!(uid = %uid, "no profile document for session");
            Profile::Missing {
                uid,
                email: principal.email,
            }
        }
        Err(err) => {
            match err {
                RemoteError::NotFound { .. } => {}
                ref other => error!(uid = %uid, error = %other, "profile fetch failed"),
            }
            Profile::Missing {
                uid,
                email: principal.email,
            }
        }
    }
}
