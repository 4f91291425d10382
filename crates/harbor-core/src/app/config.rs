//! Store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wait bound applied when a blocking `get` is called without an explicit
/// timeout. A blocking retrieval never waits longer than its timeout, so
/// every call terminates within this bound by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Suffix appended to the namespace to form the channel name.
///
/// Backends that bound identifier lengths must budget for this suffix when
/// they validate the namespace.
pub const CHANNEL_SUFFIX: &str = "_events";

fn default_namespace() -> String {
    "harbor_results".to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Configuration of one store instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Prefix isolating deployments: names the result table and derives
    /// the notification channel name.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Connection target of the backing store. Unused by the in-memory
    /// backend.
    #[serde(default)]
    pub url: Option<String>,

    /// Used when the caller omits a timeout on a blocking `get`.
    #[serde(default = "default_timeout")]
    pub default_timeout: Duration,
}

impl StoreConfig {
    /// The fixed pub/sub channel name of this store instance.
    ///
    /// Derived from the namespace so deployments are isolated on the
    /// notification surface the same way they are on the table.
    pub fn channel(&self) -> String {
        format!("{}{CHANNEL_SUFFIX}", self.namespace)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            url: None,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}
