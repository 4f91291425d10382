//! Result table over PostgreSQL.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgPool;
use tracing::debug;

use harbor_core::StoreError;
use harbor_core::app::CHANNEL_SUFFIX;
use harbor_core::domain::{ResultRecord, StorageKey};
use harbor_core::ports::{ResultTable, TableError};

/// PostgreSQL caps identifiers at 63 bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// The namespace names both the relation and, with [`CHANNEL_SUFFIX`]
/// appended, the NOTIFY channel. Channel names are identifiers too, so the
/// namespace gets the tighter bound; otherwise `pg_notify` would reject the
/// composed name at publish time - after the row was already committed -
/// while `LISTEN` silently truncates it to a different name.
const MAX_NAMESPACE_LEN: usize = MAX_IDENTIFIER_LEN - CHANNEL_SUFFIX.len();

/// One result table, named after the store's namespace.
///
/// Layout:
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS "<namespace>" (
///     message_key VARCHAR(256) PRIMARY KEY,
///     payload     BYTEA NOT NULL,
///     created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at  TIMESTAMPTZ NULL
/// )
/// ```
///
/// Expiry is compared against `NOW()` inside the query, so the database
/// clock decides what is expired; skew between producer and consumer hosts
/// cannot resurrect a dead record. Expired rows are left in place (lazy
/// expiry, no reaper here).
#[derive(Debug)]
pub struct PgResultTable {
    pool: PgPool,
    table: String,
}

impl PgResultTable {
    /// Wrap an existing pool. Fails when `namespace` is not a plain
    /// identifier (letters, digits, underscores) short enough to name both
    /// the table and the derived notification channel.
    pub fn new(pool: PgPool, namespace: &str) -> Result<Self, StoreError> {
        validate_namespace(namespace)?;
        Ok(Self {
            pool,
            table: namespace.to_string(),
        })
    }
}

fn validate_namespace(namespace: &str) -> Result<(), StoreError> {
    let plain = !namespace.is_empty()
        && namespace.len() <= MAX_NAMESPACE_LEN
        && namespace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !namespace.starts_with(|c: char| c.is_ascii_digit());
    if plain {
        Ok(())
    } else {
        Err(StoreError::InvalidConfig(format!(
            "namespace {namespace:?} is not usable as a table and channel name \
             (letters, digits, underscores, at most {MAX_NAMESPACE_LEN} bytes)"
        )))
    }
}

fn lost(err: sqlx::Error) -> TableError {
    TableError::ConnectionLost(err.to_string())
}

#[async_trait]
impl ResultTable for PgResultTable {
    async fn ensure_schema(&self) -> Result<(), TableError> {
        let create = format!(
            r#"CREATE TABLE IF NOT EXISTS "{table}" (
                message_key VARCHAR(256) PRIMARY KEY,
                payload     BYTEA NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                expires_at  TIMESTAMPTZ NULL
            )"#,
            table = self.table
        );

        if let Err(err) = sqlx::query(&create).execute(&self.pool).await {
            // Concurrent ensure_schema from another process can still race
            // past IF NOT EXISTS; "already exists" is success.
            match err.as_database_error().and_then(|db| db.code()) {
                Some(code) if code == "42P07" || code == "23505" => {}
                _ => return Err(lost(err)),
            }
        }

        // Probe the shape: an existing relation under this name that lacks
        // our columns is a deployment error, surfaced only here.
        let probe = format!(
            r#"SELECT message_key, payload, created_at, expires_at FROM "{table}" LIMIT 0"#,
            table = self.table
        );
        match sqlx::query(&probe).execute(&self.pool).await {
            Ok(_) => Ok(()),
            Err(err) if err.as_database_error().is_some() => {
                Err(TableError::SchemaMismatch(err.to_string()))
            }
            Err(err) => Err(lost(err)),
        }
    }

    async fn put(
        &self,
        key: &StorageKey,
        payload: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), TableError> {
        let sql = format!(
            r#"INSERT INTO "{table}" (message_key, payload, expires_at)
               VALUES ($1, $2, CASE WHEN $3::float8 IS NULL THEN NULL
                                    ELSE NOW() + make_interval(secs => $3) END)
               ON CONFLICT (message_key) DO UPDATE
               SET payload = EXCLUDED.payload,
                   created_at = NOW(),
                   expires_at = EXCLUDED.expires_at"#,
            table = self.table
        );

        sqlx::query(&sql)
            .bind(key.as_str())
            .bind(payload)
            .bind(ttl.map(|ttl| ttl.as_secs_f64()))
            .execute(&self.pool)
            .await
            .map_err(lost)?;
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Option<ResultRecord>, TableError> {
        let sql = format!(
            r#"SELECT message_key, payload, created_at, expires_at,
                      (expires_at IS NOT NULL AND expires_at < NOW()) AS expired
               FROM "{table}" WHERE message_key = $1"#,
            table = self.table
        );

        let row = sqlx::query(&sql)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(lost)?;

        let Some(row) = row else {
            return Ok(None);
        };

        if row.try_get::<bool, _>("expired").map_err(lost)? {
            debug!(key = %key, "record expired, treating as missing");
            return Ok(None);
        }

        Ok(Some(ResultRecord {
            key: StorageKey::from_raw(row.try_get::<String, _>("message_key").map_err(lost)?),
            payload: row.try_get::<Vec<u8>, _>("payload").map_err(lost)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(lost)?,
            expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("expires_at")
                .map_err(lost)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use harbor_core::StoreConfig;

    use super::*;

    #[test]
    fn test_namespace_validation() {
        assert!(validate_namespace("harbor_results").is_ok());
        assert!(validate_namespace("results2").is_ok());
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("2results").is_err());
        assert!(validate_namespace("bad-name").is_err());
        assert!(matches!(
            validate_namespace(r#"x"; DROP TABLE y; --"#),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_namespace_bound_leaves_room_for_the_channel_name() {
        let namespace = "n".repeat(MAX_NAMESPACE_LEN);
        assert!(validate_namespace(&namespace).is_ok());
        assert!(validate_namespace(&format!("{namespace}n")).is_err());

        // The longest accepted namespace still yields a channel name that
        // fits a Postgres identifier, so LISTEN and pg_notify agree on it.
        let config = StoreConfig {
            namespace,
            ..StoreConfig::default()
        };
        assert_eq!(config.channel().len(), MAX_IDENTIFIER_LEN);
    }
}
