//! ResultStore - the facade the task-queue side talks to.

use std::time::Duration;

use tracing::debug;

use super::config::StoreConfig;
use super::coordinator;
use crate::domain::StorageKey;
use crate::error::StoreError;
use crate::ports::{NotificationChannel, ResultTable};

/// One store instance: a table backend, a channel backend, and the config
/// binding them to a namespace.
///
/// Created once and kept for the life of the process; all operations are
/// scheduled onto the caller's runtime, no execution context is spun up per
/// call.
#[derive(Debug)]
pub struct ResultStore<T, C> {
    table: T,
    channel: C,
    config: StoreConfig,
}

impl<T, C> ResultStore<T, C>
where
    T: ResultTable,
    C: NotificationChannel,
{
    pub fn new(table: T, channel: C, config: StoreConfig) -> Self {
        Self {
            table,
            channel,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Idempotent schema creation; safe to call from every process at
    /// startup.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.table.ensure_schema().await?;
        Ok(())
    }

    /// Store `payload` for `task_id`, then announce it on the channel.
    ///
    /// The write completes before the publish is issued, so no consumer can
    /// observe the hint before a read of the key succeeds. TTL semantics
    /// are those of [`ResultTable::put`]: `None` never expires,
    /// `Some(Duration::ZERO)` expires immediately.
    pub async fn put(
        &self,
        task_id: &str,
        payload: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let key = self.key(task_id)?;
        self.table.put(&key, payload, ttl).await?;
        debug!(key = %key, bytes = payload.len(), ?ttl, "result stored");
        self.channel.publish(&key).await?;
        Ok(())
    }

    /// Retrieve the payload for `task_id`.
    ///
    /// With `block = false` this is a single peek: missing or expired gives
    /// [`StoreError::ResultMissing`]. With `block = true` the call waits for
    /// the result up to `timeout` (the configured default when `None`) and
    /// always terminates within that bound, success or
    /// [`StoreError::ResultTimeout`].
    pub async fn get(
        &self,
        task_id: &str,
        block: bool,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, StoreError> {
        let key = self.key(task_id)?;
        let timeout = timeout.unwrap_or(self.config.default_timeout);
        coordinator::get_result(&self.table, &self.channel, &key, block, timeout).await
    }

    fn key(&self, task_id: &str) -> Result<StorageKey, StoreError> {
        StorageKey::build(&self.config.namespace, task_id)
    }
}
