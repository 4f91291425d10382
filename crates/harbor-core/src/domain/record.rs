//! Result record: one stored result and its expiry state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::key::StorageKey;

/// One stored result.
///
/// At most one record exists per [`StorageKey`] at any time; writes are
/// create-or-replace by key, last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub key: StorageKey,

    /// Encoded result bytes; opaque to the store.
    pub payload: Vec<u8>,

    pub created_at: DateTime<Utc>,

    /// `None` means the record never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ResultRecord {
    /// Whether the record is logically absent at `now`.
    ///
    /// An expired record may still be physically stored (expiry is lazy, no
    /// background reaper runs here); every read path must treat it as
    /// missing.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at < now)
    }
}
