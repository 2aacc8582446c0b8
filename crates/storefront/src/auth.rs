//! Account flows: login, registration, password reset.
//!
//! Each flow validates locally, calls the identity provider, toasts the
//! outcome in the provider-code-to-friendly-text mapping, and requests
//! the follow-up navigation. The session store picks the actual sign-in
//! up from the auth-state stream; nothing here mutates session state
//! directly.

use serde_json::json;
use tracing::{error, info, instrument};

use voltlane_core::types::{Email, UserRole};
use voltlane_remote::{Notifier, SharedAuth, SharedStore, collections, server_timestamp};

use crate::error::AppError;
use crate::navigate::{Navigator, Route};

/// Drives the account forms.
pub struct AuthService {
    store: SharedStore,
    auth: SharedAuth,
    notifier: Notifier,
    navigator: Navigator,
}

impl AuthService {
    /// Create the auth service.
    #[must_use]
    pub const fn new(
        store: SharedStore,
        auth: SharedAuth,
        notifier: Notifier,
        navigator: Navigator,
    ) -> Self {
        Self {
            store,
            auth,
            notifier,
            navigator,
        }
    }

    /// Sign in with email and password, then go home.
    ///
    /// # Errors
    ///
    /// Provider rejections are toasted with their friendly text and
    /// returned.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, raw_email: &str, password: &str) -> Result<(), AppError> {
        let email = Email::parse(raw_email)?;
        match self.auth.sign_in_with_password(&email, password).await {
            Ok(principal) => {
                info!(uid = %principal.uid, "signed in");
                self.notifier.success("Login Successful");
                self.navigator.go(Route::Home);
                Ok(())
            }
            Err(err) => {
                let err = AppError::from(err);
                self.notifier.error(err.user_message());
                Err(err)
            }
        }
    }

    /// Create an account and its profile document, then send the user to
    /// the login form. Registration does not sign the session in.
    ///
    /// # Errors
    ///
    /// Validation failures return untoasted; provider and profile-write
    /// failures are toasted and returned.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        full_name: &str,
        raw_email: &str,
        password: &str,
    ) -> Result<(), AppError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".to_owned()));
        }
        let email = Email::parse(raw_email)?;

        let principal = match self.auth.create_user_with_password(&email, password).await {
            Ok(principal) => principal,
            Err(err) => {
                let err = AppError::from(err);
                self.notifier.error(err.user_message());
                return Err(err);
            }
        };

        let profile = json!({
            "fullName": full_name,
            "email": email,
            "role": UserRole::default(),
            "favorites": [],
            "createdAt": server_timestamp(),
        });
        if let Err(err) = self
            .store
            .set(collections::USERS, principal.uid.as_str(), profile)
            .await
        {
            // Account exists but the profile write failed; the session
            // will resolve as profile-missing until it is repaired.
            error!(uid = %principal.uid, error = %err, "profile write failed after signup");
            let err = AppError::from(err);
            self.notifier.error(err.user_message());
            return Err(err);
        }

        info!(uid = %principal.uid, "account registered");
        self.notifier
            .success("Account created successfully! Please log in.");
        self.navigator.go(Route::Login);
        Ok(())
    }

    /// Request a password-reset email, then return to the login form.
    ///
    /// # Errors
    ///
    /// Toasted and returned; an unknown email is reported as such.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, raw_email: &str) -> Result<(), AppError> {
        let email = Email::parse(raw_email)?;
        match self.auth.send_password_reset_email(&email).await {
            Ok(()) => {
                self.notifier
                    .success("Password reset email sent! Check your inbox.");
                self.navigator.go(Route::Login);
                Ok(())
            }
            Err(err) => {
                let err = AppError::from(err);
                self.notifier.error(err.user_message());
                Err(err)
            }
        }
    }

    /// Redeem a reset code and set a new password.
    ///
    /// A dead code (expired or already used) sends the user back to the
    /// request form; a weak password keeps them on the reset form.
    ///
    /// # Errors
    ///
    /// Toasted and returned.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<(), AppError> {
        match self.auth.confirm_password_reset(code, new_password).await {
            Ok(()) => {
                self.notifier
                    .success("Password reset successful! Please log in with your new password.");
                self.navigator.go(Route::Login);
                Ok(())
            }
            Err(err) => {
                let dead_code = matches!(
                    err,
                    voltlane_remote::RemoteError::ExpiredActionCode
                        | voltlane_remote::RemoteError::InvalidActionCode
                );
                let err = AppError::from(err);
                self.notifier.error(err.user_message());
                if dead_code {
                    self.navigator.go(Route::ForgotPassword);
                }
                Err(err)
            }
        }
    }
}
