//! Blocking retrieval coordinator.
//!
//! Resolves the race between "the result is already there" and "the result
//! arrives while we start waiting" with a check, then subscribe, then
//! re-check protocol:
//!
//! 1. read the table; a hit never waits at all
//! 2. on a miss, open the subscription
//! 3. read the table again - a write committed between step 1 and the
//!    subscription taking effect would otherwise never wake us (the lost
//!    wakeup)
//! 4. race the event stream against the deadline with `select!`; each
//!    matching event triggers a fresh table read, because an event is a
//!    hint and only the table is authoritative
//!
//! No polling loop runs anywhere: progress is driven by the stream and one
//! deadline timer, so latency tracks notification propagation, not a poll
//! interval.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::domain::StorageKey;
use crate::error::StoreError;
use crate::ports::{NotificationChannel, ResultTable};

pub(crate) async fn get_result<T, C>(
    table: &T,
    channel: &C,
    key: &StorageKey,
    block: bool,
    timeout: Duration,
) -> Result<Vec<u8>, StoreError>
where
    T: ResultTable,
    C: NotificationChannel,
{
    if !block {
        return match table.get(key).await? {
            Some(record) => Ok(record.payload),
            None => Err(StoreError::ResultMissing(key.clone())),
        };
    }

    let deadline = Instant::now() + timeout;

    if let Some(record) = table.get(key).await? {
        return Ok(record.payload);
    }

    let mut stream = channel.subscribe().await?;

    // The write may have committed between the miss above and the
    // subscription taking effect; its notification is already gone.
    if let Some(record) = table.get(key).await? {
        return Ok(record.payload);
    }

    // The subscription is dropped on every exit path below, including
    // cancellation of this future.
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                debug!(key = %key, ?timeout, "blocking retrieval timed out");
                return Err(StoreError::ResultTimeout {
                    key: key.clone(),
                    timeout,
                });
            }
            event = stream.recv() => {
                let event = event?;
                if event.payload != *key {
                    continue;
                }
                match table.get(key).await? {
                    Some(record) => return Ok(record.payload),
                    // Stale hint: the row expired between publish and this
                    // read, or the event lied. Keep waiting out the deadline.
                    None => debug!(key = %key, "stale notification, still waiting"),
                }
            }
        }
    }
}
