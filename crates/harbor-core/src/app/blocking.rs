//! Synchronous facade for callers outside any async runtime.

use std::io;
use std::time::Duration;

use super::store::ResultStore;
use crate::error::StoreError;
use crate::ports::{NotificationChannel, ResultTable};

/// Synchronous wrapper around [`ResultStore`].
///
/// Owns one tokio runtime, created at construction and torn down when the
/// store is dropped; every call is scheduled onto it. This keeps the
/// execution context long-lived instead of recreating one per operation,
/// and it keeps sync and async callers on separate connection state: a
/// caller already inside a runtime should use [`ResultStore`] directly
/// (calling these methods there would panic on nested `block_on`).
pub struct BlockingStore<T, C> {
    store: ResultStore<T, C>,
    runtime: tokio::runtime::Runtime,
}

impl<T, C> BlockingStore<T, C>
where
    T: ResultTable,
    C: NotificationChannel,
{
    pub fn new(store: ResultStore<T, C>) -> Result<Self, io::Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        Ok(Self { store, runtime })
    }

    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.runtime.block_on(self.store.ensure_schema())
    }

    pub fn put(
        &self,
        task_id: &str,
        payload: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        self.runtime.block_on(self.store.put(task_id, payload, ttl))
    }

    pub fn get(
        &self,
        task_id: &str,
        block: bool,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, StoreError> {
        self.runtime.block_on(self.store.get(task_id, block, timeout))
    }

    /// Shut the runtime down and hand the async store back.
    pub fn into_inner(self) -> ResultStore<T, C> {
        let Self { store, runtime } = self;
        runtime.shutdown_background();
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{StoreBuilder, StoreConfig};
    use crate::impls::{MemoryChannel, MemoryTable};

    fn blocking_store() -> BlockingStore<MemoryTable, MemoryChannel> {
        let config = StoreConfig::default();
        let store = StoreBuilder::new(MemoryTable::new(), MemoryChannel::new(config.channel()))
            .config(config)
            .build()
            .unwrap();
        BlockingStore::new(store).unwrap()
    }

    #[test]
    fn test_sync_roundtrip() {
        let store = blocking_store();
        store.ensure_schema().unwrap();
        store
            .put("task-1", b"payload", Some(Duration::from_secs(60)))
            .unwrap();
        assert_eq!(store.get("task-1", false, None).unwrap(), b"payload");
    }

    #[test]
    fn test_sync_blocking_get_times_out() {
        let store = blocking_store();
        let err = store
            .get("never", true, Some(Duration::from_millis(200)))
            .unwrap_err();
        assert!(matches!(err, StoreError::ResultTimeout { .. }));
    }
}
