//! Newsletter signup.

use serde_json::json;
use tracing::{info, instrument};

use voltlane_core::types::Email;
use voltlane_remote::{Notifier, SharedStore, collections, server_timestamp};

/// Records newsletter signups.
pub struct NewsletterService {
    store: SharedStore,
    notifier: Notifier,
}

impl NewsletterService {
    /// Create the newsletter service.
    #[must_use]
    pub const fn new(store: SharedStore, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Record a signup under a service-generated id.
    ///
    /// # Errors
    ///
    /// Returns the validation or write failure; the caller surfaces it
    /// inline on the form. Success is toasted here.
    #[instrument(skip_all)]
    pub async fn subscribe(&self, raw_email: &str) -> Result<(), crate::error::AppError> {
        let email = Email::parse(raw_email)?;
        self.store
            .add(
                collections::NEWSLETTER,
                json!({
                    "email": email,
                    "createdAt": server_timestamp(),
                }),
            )
            .await?;
        info!(domain = email.domain(), "newsletter signup recorded");
        self.notifier.success("Thank you for subscribing!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use voltlane_remote::{DocumentStore, OrderBy, memory::MemoryRemote};

    #[tokio::test]
    async fn signup_is_stored_with_a_server_timestamp() {
        let remote = MemoryRemote::new();
        let notifier = Notifier::new();
        let mut toasts = notifier.subscribe();
        let service = NewsletterService::new(Arc::new(remote.clone()), notifier);

        service.subscribe("ada@example.com").await.expect("subscribe");
        assert_eq!(
            toasts.recv().await.expect("toast").message,
            "Thank you for subscribing!"
        );

        let sub = remote
            .subscribe(collections::NEWSLETTER, OrderBy::asc("createdAt"))
            .await
            .expect("query");
        let snapshot = sub.snapshot();
        assert_eq!(snapshot.docs.len(), 1);
        let stored = snapshot.docs.first().expect("doc");
        assert_eq!(stored.data.get("email").and_then(|v| v.as_str()), Some("ada@example.com"));
        // Sentinel resolved at commit, never stored verbatim.
        assert_ne!(
            stored.data.get("createdAt").and_then(|v| v.as_str()),
            Some(voltlane_remote::SERVER_TIMESTAMP)
        );
    }

    #[tokio::test]
    async fn invalid_emails_are_rejected_without_a_write() {
        let remote = MemoryRemote::new();
        let service = NewsletterService::new(Arc::new(remote.clone()), Notifier::new());

        service
            .subscribe("not-an-email")
            .await
            .expect_err("must reject");
        let sub = remote
            .subscribe(collections::NEWSLETTER, OrderBy::asc("createdAt"))
            .await
            .expect("query");
        assert!(sub.snapshot().docs.is_empty());
    }
}
