//! REST backend over a vendor-neutral JSON document API.
//!
//! Endpoint shape:
//!
//! - `GET    /v1/{collection}/{id}`     - fetch one document
//! - `PUT    /v1/{collection}/{id}`     - full replace (`If-Match` / `If-None-Match` for versioned writes)
//! - `PATCH  /v1/{collection}/{id}`     - field merge
//! - `DELETE /v1/{collection}/{id}`     - delete
//! - `POST   /v1/{collection}`          - insert under a generated id
//! - `GET    /v1/{collection}?order_by=…&direction=…` - ordered listing
//!
//! The hosted service has no push channel over plain HTTP, so standing
//! subscriptions are polled: an interval task re-fetches the ordered
//! listing and publishes a snapshot whenever the payload differs. The
//! poll task stops as soon as every subscription handle is dropped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, IF_MATCH, IF_NONE_MATCH};
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::store::DocumentStore;
use crate::types::{Direction, Document, OrderBy, QuerySnapshot, Subscription};

/// Default interval between subscription polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Connection settings for [`RestRemote`].
#[derive(Clone)]
pub struct RestConfig {
    /// Service base URL, e.g. `https://docs.voltlane.dev`.
    pub base_url: String,
    /// Bearer key for the service.
    pub api_key: SecretString,
    /// Interval between subscription polls.
    pub poll_interval: Duration,
}

impl RestConfig {
    /// Settings with the default poll interval.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Wire representation of a document.
#[derive(Debug, Deserialize)]
struct DocPayload {
    id: String,
    version: u64,
    data: Value,
}

impl From<DocPayload> for Document {
    fn from(payload: DocPayload) -> Self {
        Self {
            id: payload.id,
            version: payload.version,
            data: payload.data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedPayload {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VersionPayload {
    version: u64,
}

#[derive(Debug, Deserialize)]
struct ConflictPayload {
    #[serde(default)]
    version: Option<u64>,
}

/// HTTP document service client.
#[derive(Debug, Clone)]
pub struct RestRemote {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
}

impl RestRemote {
    /// Build a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the API key
    /// cannot be encoded as a header.
    pub fn new(config: &RestConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| RemoteError::Malformed(format!("invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            poll_interval: config.poll_interval,
        })
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!("{}/v1/{collection}/{id}", self.base_url)
    }

    fn list_url(&self, collection: &str, order_by: &OrderBy) -> String {
        let direction = match order_by.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        format!(
            "{}/v1/{collection}?order_by={}&direction={direction}",
            self.base_url, order_by.field
        )
    }

    async fn list(&self, collection: &str, order_by: &OrderBy) -> Result<QuerySnapshot, RemoteError> {
        let response = self
            .client
            .get(self.list_url(collection, order_by))
            .send()
            .await?;
        let response = check_status(response, collection, "<list>").await?;
        let docs: Vec<DocPayload> = response.json().await?;
        Ok(QuerySnapshot {
            docs: docs.into_iter().map(Document::from).collect(),
        })
    }
}

/// Map an error status to the boundary taxonomy; pass 2xx through.
async fn check_status(
    response: Response,
    collection: &str,
    id: &str,
) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(match status {
        StatusCode::NOT_FOUND => RemoteError::not_found(collection, id),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RemoteError::PermissionDenied(format!("{collection}/{id}"))
        }
        StatusCode::PRECONDITION_FAILED => {
            let actual = response
                .json::<ConflictPayload>()
                .await
                .ok()
                .and_then(|c| c.version);
            RemoteError::VersionConflict {
                expected: None,
                actual,
            }
        }
        s if s.is_server_error() => RemoteError::Unavailable(format!("HTTP {s}")),
        s => {
            let body = response.text().await.unwrap_or_default();
            RemoteError::Malformed(format!("HTTP {s}: {body}"))
        }
    })
}

#[async_trait]
impl DocumentStore for RestRemote {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError> {
        let response = self
            .client
            .get(self.doc_url(collection, id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, collection, id).await?;
        let payload: DocPayload = response.json().await?;
        Ok(Some(payload.into()))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.doc_url(collection, id))
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await?;
        check_status(response, collection, id).await?;
        Ok(())
    }

    async fn set_versioned(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        expected: Option<u64>,
    ) -> Result<u64, RemoteError> {
        let mut request = self
            .client
            .put(self.doc_url(collection, id))
            .json(&serde_json::json!({ "data": data }));
        request = match expected {
            Some(version) => request.header(IF_MATCH, format!("\"{version}\"")),
            None => request.header(IF_NONE_MATCH, "*"),
        };

        let response = request.send().await?;
        let response = match check_status(response, collection, id).await {
            Ok(response) => response,
            Err(RemoteError::VersionConflict { actual, .. }) => {
                return Err(RemoteError::VersionConflict { expected, actual });
            }
            Err(err) => return Err(err),
        };
        let payload: VersionPayload = response.json().await?;
        Ok(payload.version)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), RemoteError> {
        let response = self
            .client
            .patch(self.doc_url(collection, id))
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        check_status(response, collection, id).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.doc_url(collection, id))
            .send()
            .await?;
        // Deleting an absent document is not an error at this boundary.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response, collection, id).await?;
        Ok(())
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(format!("{}/v1/{collection}", self.base_url))
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await?;
        let response = check_status(response, collection, "<new>").await?;
        let payload: CreatedPayload = response.json().await?;
        Ok(payload.id)
    }

    async fn subscribe(
        &self,
        collection: &str,
        order_by: OrderBy,
    ) -> Result<Subscription, RemoteError> {
        let initial = self.list(collection, &order_by).await?;
        let (tx, rx) = watch::channel(initial);

        let this = self.clone();
        let collection = collection.to_owned();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(this.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            debug!(collection, "polling subscription started");
            loop {
                tokio::select! {
                    () = tx.closed() => {
                        debug!(collection, "polling subscription cancelled");
                        return;
                    }
                    _ = interval.tick() => {
                        match this.list(&collection, &order_by).await {
                            Ok(snapshot) => {
                                tx.send_if_modified(|current| {
                                    if *current == snapshot {
                                        false
                                    } else {
                                        *current = snapshot;
                                        true
                                    }
                                });
                            }
                            Err(err) => {
                                // Transient poll failures keep the last
                                // snapshot; the next tick retries.
                                warn!(collection, error = %err, "subscription poll failed");
                            }
                        }
                    }
                }
            }
        });

        Ok(Subscription::new(rx))
    }
}
