//! In-memory backend for development and tests.
//!
//! `MemoryTable` keeps records in a map behind an async mutex and evaluates
//! expiry through the injected [`Clock`]; `MemoryChannel` fans events out
//! over a `tokio::sync::broadcast` channel, which drops events that nobody
//! is subscribed to - exactly the contract of the notification port.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use tokio::sync::{Mutex, broadcast};
use tracing::warn;

use crate::domain::{NotificationEvent, ResultRecord, StorageKey};
use crate::ports::{
    ChannelError, Clock, NotificationChannel, NotificationStream, ResultTable, SystemClock,
    TableError,
};

/// In-memory result table.
pub struct MemoryTable<C = SystemClock> {
    records: Arc<Mutex<HashMap<StorageKey, ResultRecord>>>,
    clock: C,
}

impl MemoryTable<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryTable<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryTable<C> {
    /// Build a table whose expiry checks run against `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }
}

#[async_trait]
impl<C: Clock> ResultTable for MemoryTable<C> {
    async fn ensure_schema(&self) -> Result<(), TableError> {
        // The map is the schema.
        Ok(())
    }

    async fn put(
        &self,
        key: &StorageKey,
        payload: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), TableError> {
        let now = self.clock.now();
        let expires_at = ttl.map(|ttl| {
            // TTLs beyond the representable range clamp to "effectively never".
            let delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
            now.checked_add_signed(delta)
                .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC)
        });

        let record = ResultRecord {
            key: key.clone(),
            payload: payload.to_vec(),
            created_at: now,
            expires_at,
        };

        let mut records = self.records.lock().await;
        records.insert(key.clone(), record);
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Option<ResultRecord>, TableError> {
        let records = self.records.lock().await;
        match records.get(key) {
            // Expired rows stay in the map (lazy expiry); reads just skip them.
            Some(record) if record.is_expired(self.clock.now()) => Ok(None),
            Some(record) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }
}

/// In-memory notification channel.
///
/// Clones share the same underlying channel, so a producer and a consumer
/// handle of the same `MemoryChannel` see each other's events.
#[derive(Clone)]
pub struct MemoryChannel {
    name: String,
    tx: broadcast::Sender<NotificationEvent>,
}

impl MemoryChannel {
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            name: name.into(),
            tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl NotificationChannel for MemoryChannel {
    async fn publish(&self, key: &StorageKey) -> Result<(), ChannelError> {
        let event = NotificationEvent {
            channel: self.name.clone(),
            payload: key.clone(),
        };
        // send() errors when there is no receiver; that is the documented
        // drop-on-no-listener behavior, not a failure.
        let _ = self.tx.send(event);
        Ok(())
    }

    async fn subscribe(&self) -> Result<Box<dyn NotificationStream>, ChannelError> {
        Ok(Box::new(MemoryStream {
            rx: self.tx.subscribe(),
        }))
    }
}

struct MemoryStream {
    rx: broadcast::Receiver<NotificationEvent>,
}

#[async_trait]
impl NotificationStream for MemoryStream {
    async fn recv(&mut self) -> Result<NotificationEvent, ChannelError> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // Best-effort contract: a dropped event can cost a
                    // waiter its timeout bound, never a wrong result. The
                    // stream itself keeps going.
                    warn!(missed, "subscriber lagged behind, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(ChannelError::ConnectionLost(
                        "notification channel closed".to_string(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::ports::FixedClock;

    fn key(task_id: &str) -> StorageKey {
        StorageKey::build("test_results", task_id).unwrap()
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let table = MemoryTable::new();
        let k = key("roundtrip");
        table
            .put(&k, b"payload", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let record = table.get(&k).await.unwrap().unwrap();
        assert_eq!(record.payload, b"payload");
        assert_eq!(record.key, k);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let table = MemoryTable::new();
        assert!(table.get(&key("never-written")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_last_write_wins() {
        let table = MemoryTable::new();
        let k = key("overwrite");
        table.put(&k, b"first", None).await.unwrap();
        table
            .put(&k, b"second", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let record = table.get(&k).await.unwrap().unwrap();
        assert_eq!(record.payload, b"second");
    }

    #[tokio::test]
    async fn test_expired_record_reads_as_missing() {
        let clock = FixedClock::new(Utc::now());
        let table = MemoryTable::with_clock(clock);
        let k = key("expiring");
        table
            .put(&k, b"payload", Some(Duration::from_secs(30)))
            .await
            .unwrap();

        assert!(table.get(&k).await.unwrap().is_some());

        table.clock.advance(TimeDelta::seconds(31));
        assert!(table.get(&k).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let clock = FixedClock::new(Utc::now());
        let table = MemoryTable::with_clock(clock);
        let k = key("durable");
        table.put(&k, b"payload", None).await.unwrap();

        table.clock.advance(TimeDelta::days(365));
        assert!(table.get(&k).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let clock = FixedClock::new(Utc::now());
        let table = MemoryTable::with_clock(clock);
        let k = key("instant");
        table
            .put(&k, b"payload", Some(Duration::ZERO))
            .await
            .unwrap();

        // expires_at == created_at, so the first tick of the clock hides it.
        table.clock.advance(TimeDelta::milliseconds(1));
        assert!(table.get(&k).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_dropped() {
        let channel = MemoryChannel::new("test_events");
        channel.publish(&key("nobody-listens")).await.unwrap();
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_key() {
        let channel = MemoryChannel::new("test_events");
        let mut stream = channel.subscribe().await.unwrap();

        let k = key("announced");
        channel.publish(&k).await.unwrap();

        let event = stream.recv().await.unwrap();
        assert_eq!(event.payload, k);
        assert_eq!(event.channel, "test_events");
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_receiving() {
        let channel = MemoryChannel::new("test_events");
        let mut stream = channel.subscribe().await.unwrap();

        // Overrun the broadcast buffer while the subscriber is not polling;
        // the oldest events are dropped, but the stream must survive the
        // lag and deliver what is still buffered.
        for i in 0..100 {
            channel.publish(&key(&format!("burst-{i}"))).await.unwrap();
        }

        let event = stream.recv().await.unwrap();
        assert!(event.payload.as_str().starts_with("test_results:burst-"));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let channel = MemoryChannel::new("test_events");
        channel.publish(&key("before")).await.unwrap();

        let mut stream = channel.subscribe().await.unwrap();
        let k = key("after");
        channel.publish(&k).await.unwrap();

        // Only the event published after subscribing arrives.
        let event = stream.recv().await.unwrap();
        assert_eq!(event.payload, k);
    }
}
