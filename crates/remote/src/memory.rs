//! In-memory backend for tests, seeding, and local development.
//!
//! Implements both [`DocumentStore`] and [`AuthGateway`] against process
//! memory: per-collection versioned documents, ordered query subscriptions
//! that push a full snapshot on every mutation, and password accounts with
//! reset codes. An offline switch makes every operation fail with
//! [`RemoteError::Unavailable`], for exercising error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;

use voltlane_core::{Email, UserId};

use crate::auth::AuthGateway;
use crate::error::RemoteError;
use crate::store::DocumentStore;
use crate::types::{
    Direction, Document, OrderBy, Principal, QuerySnapshot, SERVER_TIMESTAMP, Subscription,
};

/// Minimum password length the simulated identity provider accepts.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct StoredDoc {
    data: Value,
    version: u64,
    /// Insertion sequence, used as a stable tie-break when ordering.
    inserted: u64,
}

#[derive(Debug, Default)]
struct Collection {
    docs: HashMap<String, StoredDoc>,
}

struct Watcher {
    collection: String,
    order_by: OrderBy,
    tx: watch::Sender<QuerySnapshot>,
}

struct Account {
    uid: UserId,
    password: String,
}

struct ResetCode {
    email: String,
    expired: bool,
}

struct Inner {
    collections: Mutex<HashMap<String, Collection>>,
    watchers: Mutex<Vec<Watcher>>,
    accounts: Mutex<HashMap<String, Account>>,
    reset_codes: Mutex<HashMap<String, ResetCode>>,
    auth_tx: watch::Sender<Option<Principal>>,
    offline: AtomicBool,
    next_seq: AtomicU64,
    next_uid: AtomicU64,
    next_code: AtomicU64,
}

/// In-memory remote service.
///
/// Cheaply cloneable; clones share state, so a test can hold one handle
/// for assertions while the application under test holds another.
#[derive(Clone)]
pub struct MemoryRemote {
    inner: Arc<Inner>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    /// Create an empty in-memory service with no session signed in.
    #[must_use]
    pub fn new() -> Self {
        let (auth_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                collections: Mutex::new(HashMap::new()),
                watchers: Mutex::new(Vec::new()),
                accounts: Mutex::new(HashMap::new()),
                reset_codes: Mutex::new(HashMap::new()),
                auth_tx,
                offline: AtomicBool::new(false),
                next_seq: AtomicU64::new(1),
                next_uid: AtomicU64::new(1),
                next_code: AtomicU64::new(1),
            }),
        }
    }

    /// Simulate losing (or regaining) connectivity: while offline, every
    /// operation fails with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Seed a password account with a fixed uid, bypassing the provider's
    /// password policy. Intended for tests and local seeding where the uid
    /// must be known in advance.
    pub fn register_account(
        &self,
        uid: impl Into<UserId>,
        email: &str,
        password: &str,
    ) -> Result<(), RemoteError> {
        let mut accounts = lock(&self.inner.accounts);
        if accounts.contains_key(email) {
            return Err(RemoteError::EmailAlreadyInUse);
        }
        accounts.insert(
            email.to_owned(),
            Account {
                uid: uid.into(),
                password: password.to_owned(),
            },
        );
        Ok(())
    }

    /// The most recent unexpired reset code issued for `email`, if any.
    #[must_use]
    pub fn issued_reset_code(&self, email: &str) -> Option<String> {
        let codes = lock(&self.inner.reset_codes);
        codes
            .iter()
            .filter(|(_, entry)| entry.email == email && !entry.expired)
            .map(|(code, _)| code.clone())
            .max()
    }

    /// Mark a reset code as expired. Returns false if the code is unknown.
    pub fn expire_reset_code(&self, code: &str) -> bool {
        let mut codes = lock(&self.inner.reset_codes);
        match codes.get_mut(code) {
            Some(entry) => {
                entry.expired = true;
                true
            }
            None => false,
        }
    }

    fn ensure_online(&self) -> Result<(), RemoteError> {
        if self.inner.offline.load(AtomicOrdering::SeqCst) {
            return Err(RemoteError::Unavailable("simulated offline".to_owned()));
        }
        Ok(())
    }

    /// Snapshot of `collection` under `order_by`, ties broken by insertion.
    fn snapshot(&self, collection: &str, order_by: &OrderBy) -> QuerySnapshot {
        let collections = lock(&self.inner.collections);
        let Some(coll) = collections.get(collection) else {
            return QuerySnapshot::default();
        };

        let mut entries: Vec<(&String, &StoredDoc)> = coll.docs.iter().collect();
        entries.sort_by(|(_, a), (_, b)| {
            let field_a = a.data.get(&order_by.field).unwrap_or(&Value::Null);
            let field_b = b.data.get(&order_by.field).unwrap_or(&Value::Null);
            cmp_field(field_a, field_b).then_with(|| a.inserted.cmp(&b.inserted))
        });
        if order_by.direction == Direction::Descending {
            entries.reverse();
        }

        QuerySnapshot {
            docs: entries
                .into_iter()
                .map(|(id, doc)| Document {
                    id: id.clone(),
                    version: doc.version,
                    data: doc.data.clone(),
                })
                .collect(),
        }
    }

    /// Push fresh snapshots to every watcher of `collection`, pruning
    /// watchers whose subscriptions have been dropped.
    fn notify_watchers(&self, collection: &str) {
        let mut watchers = lock(&self.inner.watchers);
        watchers.retain(|w| !w.tx.is_closed());
        for watcher in watchers.iter().filter(|w| w.collection == collection) {
            let snapshot = self.snapshot(collection, &watcher.order_by);
            // Receivers may have raced the is_closed check; a failed send
            // just means the subscription is gone.
            let _ = watcher.tx.send(snapshot);
        }
    }

    fn next_seq(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, AtomicOrdering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Order two payload field values. Mixed types rank Null < Bool < Number
/// < String, matching how the hosted service orders heterogeneous fields.
fn cmp_field(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Replace every [`SERVER_TIMESTAMP`] sentinel in `value` with `now`.
///
/// `now` is RFC 3339 with fixed-width fractional seconds, so the stored
/// strings order lexicographically the same as chronologically.
fn resolve_server_timestamps(value: &mut Value, now: &str) {
    match value {
        Value::String(s) if s == SERVER_TIMESTAMP => {
            *value = Value::String(now.to_owned());
        }
        Value::Object(map) => {
            for field in map.values_mut() {
                resolve_server_timestamps(field, now);
            }
        }
        Value::Array(items) => {
            for item in items {
                resolve_server_timestamps(item, now);
            }
        }
        _ => {}
    }
}

fn commit_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl DocumentStore for MemoryRemote {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError> {
        self.ensure_online()?;
        let collections = lock(&self.inner.collections);
        Ok(collections.get(collection).and_then(|coll| {
            coll.docs.get(id).map(|doc| Document {
                id: id.to_owned(),
                version: doc.version,
                data: doc.data.clone(),
            })
        }))
    }

    async fn set(&self, collection: &str, id: &str, mut data: Value) -> Result<(), RemoteError> {
        self.ensure_online()?;
        resolve_server_timestamps(&mut data, &commit_time());
        {
            let mut collections = lock(&self.inner.collections);
            let coll = collections.entry(collection.to_owned()).or_default();
            let (version, inserted) = match coll.docs.get(id) {
                Some(existing) => (existing.version + 1, existing.inserted),
                None => (1, self.next_seq()),
            };
            coll.docs.insert(
                id.to_owned(),
                StoredDoc {
                    data,
                    version,
                    inserted,
                },
            );
        }
        self.notify_watchers(collection);
        Ok(())
    }

    async fn set_versioned(
        &self,
        collection: &str,
        id: &str,
        mut data: Value,
        expected: Option<u64>,
    ) -> Result<u64, RemoteError> {
        self.ensure_online()?;
        resolve_server_timestamps(&mut data, &commit_time());
        let version = {
            let mut collections = lock(&self.inner.collections);
            let coll = collections.entry(collection.to_owned()).or_default();
            let actual = coll.docs.get(id).map(|doc| doc.version);
            if actual != expected {
                return Err(RemoteError::VersionConflict { expected, actual });
            }
            let version = actual.unwrap_or(0) + 1;
            let inserted = coll
                .docs
                .get(id)
                .map_or_else(|| self.next_seq(), |doc| doc.inserted);
            coll.docs.insert(
                id.to_owned(),
                StoredDoc {
                    data,
                    version,
                    inserted,
                },
            );
            version
        };
        self.notify_watchers(collection);
        Ok(version)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let now = commit_time();
        {
            let mut collections = lock(&self.inner.collections);
            let doc = collections
                .get_mut(collection)
                .and_then(|coll| coll.docs.get_mut(id))
                .ok_or_else(|| RemoteError::not_found(collection, id))?;

            let Some(target) = doc.data.as_object_mut() else {
                return Err(RemoteError::Malformed(format!(
                    "{collection}/{id} payload is not an object"
                )));
            };
            for (key, mut value) in fields {
                resolve_server_timestamps(&mut value, &now);
                target.insert(key, value);
            }
            doc.version += 1;
        }
        self.notify_watchers(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let removed = {
            let mut collections = lock(&self.inner.collections);
            collections
                .get_mut(collection)
                .is_some_and(|coll| coll.docs.remove(id).is_some())
        };
        if removed {
            self.notify_watchers(collection);
        }
        Ok(())
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, RemoteError> {
        self.ensure_online()?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.set(collection, &id, data).await?;
        Ok(id)
    }

    async fn subscribe(
        &self,
        collection: &str,
        order_by: OrderBy,
    ) -> Result<Subscription, RemoteError> {
        self.ensure_online()?;
        let initial = self.snapshot(collection, &order_by);
        let (tx, rx) = watch::channel(initial);
        lock(&self.inner.watchers).push(Watcher {
            collection: collection.to_owned(),
            order_by,
            tx,
        });
        debug!(collection, "opened memory subscription");
        Ok(Subscription::new(rx))
    }
}

#[async_trait]
impl AuthGateway for MemoryRemote {
    fn auth_state(&self) -> watch::Receiver<Option<Principal>> {
        self.inner.auth_tx.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Principal, RemoteError> {
        self.ensure_online()?;
        let principal = {
            let accounts = lock(&self.inner.accounts);
            let account = accounts
                .get(email.as_str())
                .ok_or(RemoteError::UserNotFound)?;
            if account.password != password {
                return Err(RemoteError::InvalidCredentials);
            }
            Principal {
                uid: account.uid.clone(),
                email: Some(email.clone()),
            }
        };
        self.inner.auth_tx.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn create_user_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Principal, RemoteError> {
        self.ensure_online()?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(RemoteError::WeakPassword(format!(
                "must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let mut accounts = lock(&self.inner.accounts);
        if accounts.contains_key(email.as_str()) {
            return Err(RemoteError::EmailAlreadyInUse);
        }
        let uid = UserId::new(format!(
            "uid-{}",
            self.inner.next_uid.fetch_add(1, AtomicOrdering::SeqCst)
        ));
        accounts.insert(
            email.as_str().to_owned(),
            Account {
                uid: uid.clone(),
                password: password.to_owned(),
            },
        );
        Ok(Principal {
            uid,
            email: Some(email.clone()),
        })
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.ensure_online()?;
        self.inner.auth_tx.send_replace(None);
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &Email) -> Result<(), RemoteError> {
        self.ensure_online()?;
        {
            let accounts = lock(&self.inner.accounts);
            if !accounts.contains_key(email.as_str()) {
                return Err(RemoteError::UserNotFound);
            }
        }
        let code = format!(
            "reset-{}",
            self.inner.next_code.fetch_add(1, AtomicOrdering::SeqCst)
        );
        lock(&self.inner.reset_codes).insert(
            code,
            ResetCode {
                email: email.as_str().to_owned(),
                expired: false,
            },
        );
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> Result<(), RemoteError> {
        self.ensure_online()?;
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(RemoteError::WeakPassword(format!(
                "must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let email = {
            let mut codes = lock(&self.inner.reset_codes);
            let entry = codes.get(code).ok_or(RemoteError::InvalidActionCode)?;
            if entry.expired {
                return Err(RemoteError::ExpiredActionCode);
            }
            codes
                .remove(code)
                .map(|entry| entry.email)
                .ok_or(RemoteError::InvalidActionCode)?
        };
        let mut accounts = lock(&self.inner.accounts);
        let account = accounts.get_mut(&email).ok_or(RemoteError::UserNotFound)?;
        account.password = new_password.to_owned();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_bumps_versions_and_get_round_trips() {
        let remote = MemoryRemote::new();
        remote
            .set("products", "p1", json!({ "name": "Volt Phone" }))
            .await
            .expect("set");
        remote
            .set("products", "p1", json!({ "name": "Volt Phone 2" }))
            .await
            .expect("set again");

        let doc = remote
            .get("products", "p1")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(doc.version, 2);
        assert_eq!(doc.data["name"], "Volt Phone 2");

        assert!(
            remote
                .get("products", "missing")
                .await
                .expect("get")
                .is_none()
        );
    }

    #[tokio::test]
    async fn versioned_writes_reject_stale_expectations() {
        let remote = MemoryRemote::new();
        let v1 = remote
            .set_versioned("carts", "u1", json!({ "cartItems": [] }), None)
            .await
            .expect("create");
        assert_eq!(v1, 1);

        // Create-only write against an existing doc must fail.
        let err = remote
            .set_versioned("carts", "u1", json!({ "cartItems": [] }), None)
            .await
            .expect_err("conflict");
        assert!(matches!(
            err,
            RemoteError::VersionConflict {
                expected: None,
                actual: Some(1)
            }
        ));

        let v2 = remote
            .set_versioned("carts", "u1", json!({ "cartItems": [1] }), Some(1))
            .await
            .expect("cas");
        assert_eq!(v2, 2);
    }

    #[tokio::test]
    async fn subscriptions_push_ordered_snapshots_on_change() {
        let remote = MemoryRemote::new();
        remote
            .set("products", "a", json!({ "createdAt": "2026-01-01T00:00:00Z" }))
            .await
            .expect("set");

        let mut sub = remote
            .subscribe("products", OrderBy::asc("createdAt"))
            .await
            .expect("subscribe");
        assert_eq!(sub.snapshot().docs.len(), 1);

        remote
            .set("products", "b", json!({ "createdAt": "2025-01-01T00:00:00Z" }))
            .await
            .expect("set");
        sub.changed().await.expect("push");

        let ids: Vec<_> = sub.snapshot().docs.into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b".to_owned(), "a".to_owned()]);
    }

    #[tokio::test]
    async fn server_timestamps_are_resolved_on_write() {
        let remote = MemoryRemote::new();
        remote
            .set(
                "newsletter",
                "s1",
                json!({ "email": "a@b.c", "createdAt": crate::server_timestamp() }),
            )
            .await
            .expect("set");

        let doc = remote
            .get("newsletter", "s1")
            .await
            .expect("get")
            .expect("present");
        let created_at = doc.data["createdAt"].as_str().expect("string");
        assert_ne!(created_at, SERVER_TIMESTAMP);
        assert!(created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn update_merges_fields_and_requires_existence() {
        let remote = MemoryRemote::new();
        remote
            .set("users", "u1", json!({ "fullName": "Ada", "favorites": [] }))
            .await
            .expect("set");

        let mut fields = Map::new();
        fields.insert("favorites".to_owned(), json!(["p1"]));
        remote.update("users", "u1", fields).await.expect("update");

        let doc = remote
            .get("users", "u1")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(doc.data["fullName"], "Ada");
        assert_eq!(doc.data["favorites"], json!(["p1"]));

        let err = remote
            .update("users", "nobody", Map::new())
            .await
            .expect_err("missing");
        assert!(matches!(err, RemoteError::NotFound { .. }));
    }

    #[tokio::test]
    async fn offline_mode_fails_every_operation() {
        let remote = MemoryRemote::new();
        remote.set_offline(true);
        let err = remote.get("users", "u1").await.expect_err("offline");
        assert!(matches!(err, RemoteError::Unavailable(_)));

        remote.set_offline(false);
        assert!(remote.get("users", "u1").await.is_ok());
    }

    #[tokio::test]
    async fn password_reset_flow_round_trips() {
        let remote = MemoryRemote::new();
        let email = Email::parse("ada@voltlane.dev").expect("email");
        remote
            .create_user_with_password(&email, "hunter22")
            .await
            .expect("create");

        remote
            .send_password_reset_email(&email)
            .await
            .expect("send reset");
        let code = remote
            .issued_reset_code(email.as_str())
            .expect("code issued");
        remote
            .confirm_password_reset(&code, "new-password")
            .await
            .expect("confirm");

        // The old code is consumed; the new password signs in.
        let err = remote
            .confirm_password_reset(&code, "another-one")
            .await
            .expect_err("consumed");
        assert!(matches!(err, RemoteError::InvalidActionCode));
        remote
            .sign_in_with_password(&email, "new-password")
            .await
            .expect("sign in");
    }
}
