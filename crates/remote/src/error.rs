//! Error taxonomy for the remote document service boundary.

use thiserror::Error;

/// Errors returned by [`DocumentStore`](crate::DocumentStore) and
/// [`AuthGateway`](crate::AuthGateway) operations.
///
/// The auth variants mirror the error codes the hosted identity provider
/// reports for password flows; callers map them to user-facing messages.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A requested document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection the lookup targeted.
        collection: String,
        /// Document id that was requested.
        id: String,
    },

    /// The caller is not permitted to perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The service could not be reached or returned a server error.
    #[error("remote service unavailable: {0}")]
    Unavailable(String),

    /// A versioned write lost a compare-and-swap race.
    #[error("version conflict (expected {expected:?}, actual {actual:?})")]
    VersionConflict {
        /// Version the writer expected to replace (`None` = create-only).
        expected: Option<u64>,
        /// Version the service actually holds, when known.
        actual: Option<u64>,
    },

    /// A standing subscription's push channel closed.
    #[error("subscription closed")]
    SubscriptionClosed,

    /// HTTP transport failure (REST backend).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a payload this client cannot interpret.
    #[error("malformed response from remote service: {0}")]
    Malformed(String),

    /// Sign-in rejected: wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account exists for the given email.
    #[error("no account found for this email")]
    UserNotFound,

    /// An account already exists for the given email.
    #[error("an account already exists for this email")]
    EmailAlreadyInUse,

    /// The identity provider rejected the password as too weak.
    #[error("password is too weak: {0}")]
    WeakPassword(String),

    /// A password reset code that is past its validity window.
    #[error("password reset code has expired")]
    ExpiredActionCode,

    /// A password reset code that was never issued or was already used.
    #[error("password reset code is invalid")]
    InvalidActionCode,
}

impl RemoteError {
    /// Convenience constructor for [`RemoteError::NotFound`].
    #[must_use]
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        }
    }
}

/// A document failed to decode into its typed model.
///
/// Raised at the boundary when a remote payload is missing fields or holds
/// the wrong shapes, so duck-typed documents never leak into the state
/// layer.
#[derive(Debug, Error)]
#[error("failed to decode {collection}/{id}: {source}")]
pub struct DecodeError {
    /// Collection the document came from.
    pub collection: String,
    /// Document id.
    pub id: String,
    /// Underlying deserialization failure.
    #[source]
    pub source: serde_json::Error,
}
