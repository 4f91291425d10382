//! ResultTable port - the durable mapping that is the source of truth.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ResultRecord, StorageKey};

/// Failure modes of the result table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The connection to the backing store failed. Propagated as-is; the
    /// retry policy belongs to the caller.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// An existing relation does not match the expected shape. Only raised
    /// by [`ResultTable::ensure_schema`].
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Durable mapping from storage key to result record, backed by a
/// transactional store.
///
/// Transactional operations may run concurrently with each other and with
/// an active subscription; single-row primary-key semantics are the only
/// isolation required.
#[async_trait]
pub trait ResultTable: Send + Sync {
    /// Idempotent creation of the underlying relation.
    ///
    /// Safe to call concurrently from multiple processes; "already exists"
    /// is success, not an error.
    async fn ensure_schema(&self) -> Result<(), TableError>;

    /// Create-or-replace the record for `key`; last write wins.
    ///
    /// TTL semantics: `None` means the record never expires;
    /// `Some(Duration::ZERO)` means it expires immediately. Otherwise
    /// `expires_at` is the store's own current time plus `ttl`.
    async fn put(
        &self,
        key: &StorageKey,
        payload: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), TableError>;

    /// Point lookup.
    ///
    /// Returns `None` for a key that is physically absent, and also for a
    /// record whose `expires_at` has passed by the store's own clock (not
    /// the caller's, so clock skew between processes cannot resurrect
    /// expired data). Expired rows are not purged here; reclamation is an
    /// external concern.
    async fn get(&self, key: &StorageKey) -> Result<Option<ResultRecord>, TableError>;
}
