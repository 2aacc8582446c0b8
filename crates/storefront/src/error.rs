//! Unified error handling for the storefront state layer.
//!
//! Every fallible operation returns `Result<T, AppError>`. The variant
//! carries the mechanical cause for logging; [`AppError::user_message`]
//! maps it to the friendly text shown in toasts, mirroring the provider
//! error codes the UI used to translate by hand.

use thiserror::Error;

use voltlane_core::models::AddressError;
use voltlane_core::types::EmailError;
use voltlane_remote::{DecodeError, RemoteError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote document service or identity provider failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A document payload did not match its model.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Shipping address failed validation.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Email address failed validation.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// A form field failed a client-side rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation requires a signed-in session.
    #[error("Not signed in")]
    NotSignedIn,

    /// Checkout was attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,
}

impl AppError {
    /// Friendly message for toast display.
    ///
    /// Provider failures all collapse to a small set of phrases; the raw
    /// cause goes to the log, never to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(err) => match err {
                RemoteError::InvalidCredentials => {
                    "Incorrect email or password. Please try again.".to_owned()
                }
                RemoteError::UserNotFound => "No account found with this email.".to_owned(),
                RemoteError::EmailAlreadyInUse => {
                    "This email is already registered. Try logging in instead.".to_owned()
                }
                RemoteError::WeakPassword(_) => {
                    "Password should be at least 6 characters.".to_owned()
                }
                RemoteError::ExpiredActionCode => {
                    "This reset link has expired. Please request a new one.".to_owned()
                }
                RemoteError::InvalidActionCode => {
                    "This reset link is invalid or has already been used.".to_owned()
                }
                RemoteError::Unavailable(_) | RemoteError::Http(_) => {
                    "Network error. Please check your connection and try again.".to_owned()
                }
                _ => "Something went wrong. Please try again.".to_owned(),
            },
            Self::Address(err) => err.to_string(),
            Self::Validation(message) => message.clone(),
            Self::Email(_) => "Please enter a valid email address.".to_owned(),
            Self::NotSignedIn => "Please log in to continue.".to_owned(),
            Self::EmptyCart => "Your cart is empty.".to_owned(),
            Self::Decode(_) => "Something went wrong. Please try again.".to_owned(),
        }
    }
}
