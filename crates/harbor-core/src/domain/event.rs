//! Notification event: the ephemeral pub/sub hint that a record was written.

use super::key::StorageKey;

/// A "record for this key was just written" hint.
///
/// Events are never persisted and never replayed: only listeners connected
/// at publish time receive them. A listener that subscribes afterwards will
/// not see the event even if the record still exists, which is why every
/// consumer re-checks the result table instead of trusting the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Name of the channel the event arrived on; one fixed name per store
    /// instance.
    pub channel: String,

    /// The storage key of the record that was written.
    pub payload: StorageKey,
}
