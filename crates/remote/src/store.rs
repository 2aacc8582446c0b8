//! The `DocumentStore` trait: CRUD plus subscribe-to-query.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RemoteError;
use crate::types::{Document, OrderBy, Subscription};

/// The remote document service, abstracted to the operation set Voltlane
/// actually consumes. Implementations are shared as [`SharedStore`].
///
/// All operations are asynchronous and non-blocking; none are cancelled
/// mid-flight by callers. Standing subscriptions are the only long-lived
/// resource and are cancelled by dropping the returned [`Subscription`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document, or `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError>;

    /// Full-replace write. Creates the document when absent.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), RemoteError>;

    /// Compare-and-swap full-replace write.
    ///
    /// `expected` is the version the caller believes the service holds;
    /// `None` means the document must not exist yet (create-only). Returns
    /// the version assigned to the new revision.
    ///
    /// # Errors
    ///
    /// Fails with [`RemoteError::VersionConflict`] when the stored version
    /// does not match, leaving the document untouched.
    async fn set_versioned(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        expected: Option<u64>,
    ) -> Result<u64, RemoteError>;

    /// Merge the given fields into an existing document.
    ///
    /// # Errors
    ///
    /// Fails with [`RemoteError::NotFound`] when the document is absent.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), RemoteError>;

    /// Delete a document. Deleting an absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError>;

    /// Insert a document under a service-generated id, returned on success.
    async fn add(&self, collection: &str, data: Value) -> Result<String, RemoteError>;

    /// Open a standing subscription to an ordered query over `collection`.
    ///
    /// The subscription carries the current snapshot immediately and a full
    /// replacement snapshot on every subsequent change.
    async fn subscribe(
        &self,
        collection: &str,
        order_by: OrderBy,
    ) -> Result<Subscription, RemoteError>;
}

/// Shared handle to a document store backend.
pub type SharedStore = Arc<dyn DocumentStore>;
