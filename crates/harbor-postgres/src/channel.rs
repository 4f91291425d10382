//! Notification channel over LISTEN/NOTIFY.

use async_trait::async_trait;
use sqlx::postgres::{PgListener, PgPool};
use tracing::debug;

use harbor_core::domain::{NotificationEvent, StorageKey};
use harbor_core::ports::{ChannelError, NotificationChannel, NotificationStream};

/// LISTEN/NOTIFY channel named after the store instance.
///
/// `publish` goes through the shared pool like any other statement, in a
/// connection of its own acquisition; each `subscribe` takes a dedicated
/// connection via [`PgListener`] and holds it for the stream's lifetime, so
/// query traffic can never sit in front of event delivery.
#[derive(Debug)]
pub struct PgNotificationChannel {
    pool: PgPool,
    channel: String,
}

impl PgNotificationChannel {
    pub fn new(pool: PgPool, channel: String) -> Self {
        Self { pool, channel }
    }

    pub fn channel_name(&self) -> &str {
        &self.channel
    }
}

fn lost(err: sqlx::Error) -> ChannelError {
    ChannelError::ConnectionLost(err.to_string())
}

#[async_trait]
impl NotificationChannel for PgNotificationChannel {
    async fn publish(&self, key: &StorageKey) -> Result<(), ChannelError> {
        // pg_notify delivers to current listeners only; with none connected
        // the event evaporates, which is the channel's contract.
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(&self.channel)
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(lost)?;
        debug!(channel = %self.channel, key = %key, "published notification");
        Ok(())
    }

    async fn subscribe(&self) -> Result<Box<dyn NotificationStream>, ChannelError> {
        let mut listener = PgListener::connect_with(&self.pool).await.map_err(lost)?;
        listener.listen(&self.channel).await.map_err(lost)?;
        debug!(channel = %self.channel, "subscribed");
        Ok(Box::new(PgStream { listener }))
    }
}

struct PgStream {
    listener: PgListener,
}

#[async_trait]
impl NotificationStream for PgStream {
    async fn recv(&mut self) -> Result<NotificationEvent, ChannelError> {
        // try_recv rather than recv: recv() reconnects silently, and a
        // reconnect gap loses events. The contract is to terminate the
        // stream instead, so the caller resubscribes and re-validates
        // against the result table.
        match self.listener.try_recv().await {
            Ok(Some(notification)) => Ok(NotificationEvent {
                channel: notification.channel().to_string(),
                payload: StorageKey::from_raw(notification.payload()),
            }),
            Ok(None) => Err(ChannelError::ConnectionLost(
                "listener connection dropped; events may have been missed".to_string(),
            )),
            Err(err) => Err(lost(err)),
        }
    }
}
