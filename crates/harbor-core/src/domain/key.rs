//! Storage key derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum length of a storage key, in bytes.
///
/// Matches the `VARCHAR(256)` primary-key column of the result table; the
/// key codec rejects anything longer before it ever reaches the store.
pub const MAX_KEY_LEN: usize = 256;

/// Key under which exactly one result record is stored.
///
/// Derived from a namespace and a task identifier. The composition is
/// deterministic, so producer and consumer arrive at the same key without
/// coordination, and it is never reused for a different task within the
/// record's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Compose a key as `"{namespace}:{task_id}"`.
    ///
    /// Fails with [`StoreError::KeyTooLong`] when the composed key exceeds
    /// [`MAX_KEY_LEN`].
    pub fn build(namespace: &str, task_id: &str) -> Result<Self, StoreError> {
        let key = format!("{namespace}:{task_id}");
        if key.len() > MAX_KEY_LEN {
            return Err(StoreError::KeyTooLong {
                len: key.len(),
                max: MAX_KEY_LEN,
            });
        }
        Ok(Self(key))
    }

    /// Wrap a raw key string received as a notification payload.
    ///
    /// Payloads on the channel were built by [`StorageKey::build`] on the
    /// producer side, so no length check is repeated here.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
