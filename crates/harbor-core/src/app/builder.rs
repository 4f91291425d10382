//! StoreBuilder - wiring and fail-fast validation.

use std::time::Duration;

use super::config::StoreConfig;
use super::store::ResultStore;
use crate::ports::{NotificationChannel, ResultTable};

/// Configuration errors caught at build time rather than on first use.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("namespace must not be empty")]
    EmptyNamespace,

    #[error("default timeout must be greater than zero")]
    ZeroTimeout,
}

/// Builds a [`ResultStore`] from backends and configuration.
///
/// # Example
/// ```
/// use harbor_core::StoreBuilder;
/// use harbor_core::impls::{MemoryChannel, MemoryTable};
///
/// let store = StoreBuilder::new(MemoryTable::new(), MemoryChannel::new("dev_events"))
///     .namespace("dev")
///     .build()
///     .unwrap();
/// assert_eq!(store.config().namespace, "dev");
/// ```
pub struct StoreBuilder<T, C> {
    table: T,
    channel: C,
    config: StoreConfig,
}

impl<T, C> StoreBuilder<T, C>
where
    T: ResultTable,
    C: NotificationChannel,
{
    pub fn new(table: T, channel: C) -> Self {
        Self {
            table,
            channel,
            config: StoreConfig::default(),
        }
    }

    /// Replace the whole configuration at once.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = Some(url.into());
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Validate the configuration and produce the store.
    pub fn build(self) -> Result<ResultStore<T, C>, BuildError> {
        if self.config.namespace.is_empty() {
            return Err(BuildError::EmptyNamespace);
        }
        if self.config.default_timeout.is_zero() {
            return Err(BuildError::ZeroTimeout);
        }
        Ok(ResultStore::new(self.table, self.channel, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{MemoryChannel, MemoryTable};

    #[test]
    fn test_build_success() {
        let store = StoreBuilder::new(MemoryTable::new(), MemoryChannel::new("events"))
            .namespace("results")
            .default_timeout(Duration::from_secs(5))
            .build();
        assert!(store.is_ok());
    }

    #[test]
    fn test_build_rejects_empty_namespace() {
        let store = StoreBuilder::new(MemoryTable::new(), MemoryChannel::new("events"))
            .namespace("")
            .build();
        assert!(matches!(store, Err(BuildError::EmptyNamespace)));
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let store = StoreBuilder::new(MemoryTable::new(), MemoryChannel::new("events"))
            .default_timeout(Duration::ZERO)
            .build();
        assert!(matches!(store, Err(BuildError::ZeroTimeout)));
    }
}
