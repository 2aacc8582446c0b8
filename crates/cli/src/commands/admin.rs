//! Admin profile management.
//!
//! Accounts themselves are created through the identity provider; this
//! command writes or promotes the matching `users/{uid}` profile document
//! so the dashboard's role gate recognizes it.

use serde_json::{Map, json};
use thiserror::Error;
use tracing::info;

use voltlane_core::types::{Email, EmailError, UserRole};
use voltlane_remote::rest::RestRemote;
use voltlane_remote::{DocumentStore, RemoteError, collections, server_timestamp};
use voltlane_storefront::{ConfigError, StorefrontConfig};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminCliError {
    /// Configuration failed to load.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Email failed validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Remote write failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// Create an admin profile document for `uid`, or promote an existing one.
///
/// # Errors
///
/// Returns an error if configuration is missing, the email is invalid, or
/// the write fails.
pub async fn create_user(uid: &str, email: &str, name: &str) -> Result<(), AdminCliError> {
    dotenvy::dotenv().ok();
    let config = StorefrontConfig::from_env()?;
    let email = Email::parse(email)?;

    let remote = RestRemote::new(&config.rest_config())?;

    if remote.get(collections::USERS, uid).await?.is_some() {
        // Existing profile: only flip the role.
        let mut fields = Map::new();
        fields.insert("role".to_owned(), json!(UserRole::Admin));
        remote.update(collections::USERS, uid, fields).await?;
        info!(%uid, "Existing profile promoted to admin");
        return Ok(());
    }

    remote
        .set(
            collections::USERS,
            uid,
            json!({
                "fullName": name,
                "email": email,
                "role": UserRole::Admin,
                "favorites": [],
                "createdAt": server_timestamp(),
            }),
        )
        .await?;
    info!(%uid, "Admin profile created");
    Ok(())
}
