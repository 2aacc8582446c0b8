//! Wire types for the remote document service.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use voltlane_core::{Email, UserId};

use crate::error::{DecodeError, RemoteError};

/// Sentinel placed in a document field to request a server-assigned
/// timestamp. Backends replace it with their current time at commit.
pub const SERVER_TIMESTAMP: &str = "__server_timestamp__";

/// A server-assigned timestamp placeholder, for use in document payloads.
#[must_use]
pub fn server_timestamp() -> Value {
    Value::String(SERVER_TIMESTAMP.to_owned())
}

/// A document fetched from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Service-assigned document id.
    pub id: String,
    /// Monotonic version, bumped on every write.
    pub version: u64,
    /// Schemaless payload.
    pub data: Value,
}

impl Document {
    /// Decode the payload into a typed model.
    ///
    /// The document id is injected into the payload under `"id"` before
    /// deserializing, so models carry their own identity without the
    /// service storing it redundantly.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] naming the collection and id when the
    /// payload is not an object or does not match the model's shape.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T, DecodeError> {
        let mut data = self.data.clone();
        let Some(map) = data.as_object_mut() else {
            return Err(DecodeError {
                collection: collection.to_owned(),
                id: self.id.clone(),
                source: serde::de::Error::custom("document payload is not an object"),
            });
        };
        map.insert("id".to_owned(), Value::String(self.id.clone()));

        serde_json::from_value(data).map_err(|source| DecodeError {
            collection: collection.to_owned(),
            id: self.id.clone(),
            source,
        })
    }
}

/// A full replacement snapshot of an ordered query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySnapshot {
    /// Documents in query order.
    pub docs: Vec<Document>,
}

/// Sort direction for an ordered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering clause for a query subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field of the document payload to order by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Ascending order on `field`.
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    /// Descending order on `field`.
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// An authenticated principal reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Principal {
    /// Auth uid; doubles as the `users` collection document id.
    pub uid: UserId,
    /// Email on the identity record, when known.
    pub email: Option<Email>,
}

/// A standing subscription to an ordered query.
///
/// Carries the current snapshot at all times; [`Subscription::changed`]
/// resolves when the service pushes a newer one. Dropping the subscription
/// cancels the push channel — backends stop publishing once every handle
/// is gone.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<QuerySnapshot>,
}

impl Subscription {
    /// Wrap a watch receiver produced by a backend.
    #[must_use]
    pub const fn new(rx: watch::Receiver<QuerySnapshot>) -> Self {
        Self { rx }
    }

    /// The latest snapshot pushed by the service.
    #[must_use]
    pub fn snapshot(&self) -> QuerySnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next pushed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::SubscriptionClosed`] once the backend tears
    /// the channel down.
    pub async fn changed(&mut self) -> Result<(), RemoteError> {
        self.rx
            .changed()
            .await
            .map_err(|_| RemoteError::SubscriptionClosed)
    }

    /// Cancel the subscription explicitly. Equivalent to dropping it.
    pub fn cancel(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Profile {
        id: String,
        name: String,
    }

    #[test]
    fn decode_injects_the_document_id() {
        let doc = Document {
            id: "u-1".to_owned(),
            version: 3,
            data: json!({ "name": "Ada" }),
        };

        let profile: Profile = doc.decode("users").expect("decode");
        assert_eq!(profile.id, "u-1");
        assert_eq!(profile.name, "Ada");
    }

    #[test]
    fn decode_fails_with_collection_and_id_context() {
        let doc = Document {
            id: "u-2".to_owned(),
            version: 1,
            data: json!("not an object"),
        };

        let err = doc.decode::<Profile>("users").expect_err("must fail");
        assert_eq!(err.collection, "users");
        assert_eq!(err.id, "u-2");
    }
}
