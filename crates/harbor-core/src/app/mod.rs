//! Application layer: the store facade and the blocking retrieval
//! coordinator that ties the result table and the notification channel
//! together.

pub mod blocking;
pub mod builder;
pub mod config;
mod coordinator;
pub mod store;

pub use self::blocking::BlockingStore;
pub use self::builder::{BuildError, StoreBuilder};
pub use self::config::{CHANNEL_SUFFIX, DEFAULT_TIMEOUT, StoreConfig};
pub use self::store::ResultStore;
