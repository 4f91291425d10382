//! Error taxonomy of the store.

use std::time::Duration;

use thiserror::Error;

use crate::domain::StorageKey;
use crate::ports::notification_channel::ChannelError;
use crate::ports::result_table::TableError;

/// Everything a store operation can fail with.
///
/// `ResultMissing` and `ResultTimeout` are expected and recoverable; the
/// caller owns the retry policy. Connection losses are surfaced as-is and
/// never retried inside the store. `KeyTooLong`, `InvalidConfig` and
/// `SchemaMismatch` are configuration errors and never worth retrying.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Non-blocking lookup found nothing, or the record has expired.
    #[error("result missing for key={0}")]
    ResultMissing(StorageKey),

    /// Blocking wait exceeded its deadline without a confirmed record.
    #[error("timed out after {timeout:?} waiting for key={key}")]
    ResultTimeout { key: StorageKey, timeout: Duration },

    /// The composed storage key exceeds the backing store's key-size limit.
    #[error("storage key too long: {len} bytes (max {max})")]
    KeyTooLong { len: usize, max: usize },

    /// The store was configured inconsistently (no connection target, a
    /// namespace the backend cannot use, ...). Fatal, never retried.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The existing relation does not have the expected shape. Only raised
    /// by `ensure_schema`.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The transactional connection to the backing store failed.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The notification stream terminated. Resubscribe and re-validate via
    /// the result table; events emitted during the gap are unrecoverable.
    #[error("notification channel connection lost: {0}")]
    ChannelConnectionLost(String),
}

impl From<TableError> for StoreError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::ConnectionLost(msg) => StoreError::ConnectionLost(msg),
            TableError::SchemaMismatch(msg) => StoreError::SchemaMismatch(msg),
        }
    }
}

impl From<ChannelError> for StoreError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::ConnectionLost(msg) => StoreError::ChannelConnectionLost(msg),
        }
    }
}
