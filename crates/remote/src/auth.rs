//! The `AuthGateway` trait: hosted identity provider boundary.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use voltlane_core::Email;

use crate::error::RemoteError;
use crate::types::Principal;

/// The hosted identity provider, abstracted to the password flows the
/// storefront uses. Implementations are shared as [`SharedAuth`].
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// The external auth-state stream.
    ///
    /// Carries the current principal (or `None` while signed out) and
    /// updates whenever the session changes. The session store watches this
    /// channel for its whole lifetime.
    fn auth_state(&self) -> watch::Receiver<Option<Principal>>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// [`RemoteError::UserNotFound`] when no account exists,
    /// [`RemoteError::InvalidCredentials`] on a wrong password.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Principal, RemoteError>;

    /// Create a new password account. Does not sign the session in.
    ///
    /// # Errors
    ///
    /// [`RemoteError::EmailAlreadyInUse`] or [`RemoteError::WeakPassword`].
    async fn create_user_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Principal, RemoteError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), RemoteError>;

    /// Ask the provider to email a password reset code.
    ///
    /// # Errors
    ///
    /// [`RemoteError::UserNotFound`] when no account exists for the email.
    async fn send_password_reset_email(&self, email: &Email) -> Result<(), RemoteError>;

    /// Redeem a reset code and set a new password.
    ///
    /// # Errors
    ///
    /// [`RemoteError::InvalidActionCode`], [`RemoteError::ExpiredActionCode`],
    /// or [`RemoteError::WeakPassword`].
    async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> Result<(), RemoteError>;
}

/// Shared handle to an identity provider backend.
pub type SharedAuth = Arc<dyn AuthGateway>;
