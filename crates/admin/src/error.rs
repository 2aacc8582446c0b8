//! Error type for admin operations.

use thiserror::Error;

use voltlane_remote::{DecodeError, RemoteError};

/// Errors returned by dashboard operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Remote document service failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A document payload did not match its model.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The session's profile does not carry the admin role.
    #[error("Admin access required")]
    Forbidden,

    /// A form field failed a client-side rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The targeted document does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}
