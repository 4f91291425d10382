//! NotificationChannel port - best-effort pub/sub layered on the backing store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NotificationEvent, StorageKey};

/// Failure modes of the notification channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The stream's dedicated connection failed and the stream terminated.
    /// The caller must resubscribe and re-validate state via the result
    /// table: events emitted during the gap are gone.
    #[error("channel connection lost: {0}")]
    ConnectionLost(String),
}

/// Best-effort pub/sub channel carrying storage keys as payloads.
///
/// Purely a latency optimization: durability lives in the result table, and
/// an event published while nobody listens is dropped by design.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Publish `key` to the channel. Dropped if no listener is currently
    /// connected.
    async fn publish(&self, key: &StorageKey) -> Result<(), ChannelError>;

    /// Open a long-lived subscription.
    ///
    /// The stream is served by a dedicated connection that stays open for
    /// the stream's lifetime; transactional work never shares it, so query
    /// execution cannot starve event delivery. A new call opens a fresh
    /// stream (restartable), but events missed before subscribing are not
    /// replayed.
    async fn subscribe(&self) -> Result<Box<dyn NotificationStream>, ChannelError>;
}

/// Live stream of notification events, in arrival order.
#[async_trait]
pub trait NotificationStream: Send {
    /// Wait for the next event. Returns `ChannelError::ConnectionLost`
    /// when the stream terminates.
    async fn recv(&mut self) -> Result<NotificationEvent, ChannelError>;
}
