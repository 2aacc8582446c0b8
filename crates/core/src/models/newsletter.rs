//! Newsletter subscriber records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, SubscriberId};

/// One newsletter signup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    /// Document id.
    pub id: SubscriberId,
    /// Subscribed email address.
    pub email: Email,
    /// Server-assigned signup time.
    pub created_at: DateTime<Utc>,
}
