//! harbor-postgres
//!
//! PostgreSQL backend for the harbor result store.
//!
//! - [`PgResultTable`]: the result table over a `sqlx` connection pool; one
//!   table per namespace, expiry evaluated in SQL so the database clock is
//!   authoritative.
//! - [`PgNotificationChannel`]: LISTEN/NOTIFY pub/sub; publishes through
//!   the pool, subscribes through a dedicated `PgListener` connection that
//!   is never shared with query traffic.
//!
//! [`connect`] wires both onto one shared pool and returns a ready
//! [`ResultStore`].

mod channel;
mod table;

pub use channel::PgNotificationChannel;
pub use table::PgResultTable;

use harbor_core::{ResultStore, StoreConfig, StoreError};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Open one connection pool against `config.url` and build a store on it.
///
/// The pool and the store live until dropped; nothing per-call is created.
/// The schema is not touched here; call `ensure_schema` once at startup.
pub async fn connect(
    config: StoreConfig,
) -> Result<ResultStore<PgResultTable, PgNotificationChannel>, StoreError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| StoreError::InvalidConfig("no connection url configured".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .map_err(|e| StoreError::ConnectionLost(e.to_string()))?;

    info!(namespace = %config.namespace, "connected to postgres result store");

    let table = PgResultTable::new(pool.clone(), &config.namespace)?;
    let channel = PgNotificationChannel::new(pool, config.channel());
    Ok(ResultStore::new(table, channel, config))
}
