//! Versioned key-value tables
//!
//! Each table has the shape `(key TEXT PRIMARY KEY, value TEXT, version
//! BIGINT, expires_at BIGINT NULL)`. Reads hide expired rows; writes are
//! compare-and-swap on `version` so concurrent load-modify-save cycles on
//! the same key cannot silently overwrite each other.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{KvEntry, KvError, KvPool, Result};

/// Handle to one versioned KV table
#[derive(Clone)]
pub struct KvTable {
    pool: KvPool,
    table: String,
}

impl KvTable {
    pub fn new(pool: KvPool, table: &str) -> Result<Self> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(KvError::Configuration(format!("Invalid table name: {:?}", table)));
        }
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.table
    }

    /// The pool answers and this table exists
    pub async fn is_healthy(&self) -> bool {
        self.pool.table_ready(&self.table).await
    }

    /// Create the table if it does not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(&format!(
            "CREATE TABLE IF NOT EXISTS {t} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                version BIGINT NOT NULL,
                expires_at BIGINT
            );
            CREATE INDEX IF NOT EXISTS {t}_expires_idx ON {t} (expires_at);",
            t = self.table
        ))
        .await?;
        Ok(())
    }

    /// Read a live (non-expired) row
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn get(&self, key: &str) -> Result<Option<KvEntry>> {
        let now = Utc::now().timestamp();
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                &format!(
                    "SELECT key, value, version, expires_at FROM {} \
                     WHERE key = $1 AND (expires_at IS NULL OR expires_at > $2)",
                    self.table
                ),
                &[&key, &now],
            )
            .await?;

        match row {
            Some(row) => Ok(Some(KvEntry {
                key: row.try_get(0)?,
                value: row.try_get(1)?,
                version: row.try_get(2)?,
                expires_at: row.try_get(3)?,
            })),
            None => Ok(None),
        }
    }

    /// Write `value` only if the live row is still at `expected_version`.
    ///
    /// `expected_version == 0` means "no live row": it inserts, or replaces
    /// a row that has already expired. Returns the new version.
    #[instrument(skip(self, value), fields(table = %self.table))]
    pub async fn put_if_version(
        &self,
        key: &str,
        value: &str,
        expected_version: i64,
        ttl: Option<Duration>,
    ) -> Result<i64> {
        let now = Utc::now();
        let expires_at = expiry(now, ttl);
        let now_secs = now.timestamp();
        let conn = self.pool.get().await?;

        let row = if expected_version == 0 {
            conn.query_opt(
                &format!(
                    "INSERT INTO {t} (key, value, version, expires_at) VALUES ($1, $2, 1, $3) \
                     ON CONFLICT (key) DO UPDATE \
                     SET value = EXCLUDED.value, version = {t}.version + 1, expires_at = EXCLUDED.expires_at \
                     WHERE {t}.expires_at IS NOT NULL AND {t}.expires_at <= $4 \
                     RETURNING version",
                    t = self.table
                ),
                &[&key, &value, &expires_at, &now_secs],
            )
            .await?
        } else {
            conn.query_opt(
                &format!(
                    "UPDATE {} SET value = $2, version = version + 1, expires_at = $3 \
                     WHERE key = $1 AND version = $4 AND (expires_at IS NULL OR expires_at > $5) \
                     RETURNING version",
                    self.table
                ),
                &[&key, &value, &expires_at, &expected_version, &now_secs],
            )
            .await?
        };

        match row {
            Some(row) => {
                let version: i64 = row.try_get(0)?;
                debug!(key, version, "KV write committed");
                Ok(version)
            }
            None => Err(KvError::VersionConflict {
                key: key.to_string(),
                expected: expected_version,
            }),
        }
    }

    /// Unconditional upsert, used for reference data such as catalogs
    #[instrument(skip(self, value), fields(table = %self.table))]
    pub async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<i64> {
        let expires_at = expiry(Utc::now(), ttl);
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO {t} (key, value, version, expires_at) VALUES ($1, $2, 1, $3) \
                     ON CONFLICT (key) DO UPDATE \
                     SET value = EXCLUDED.value, version = {t}.version + 1, expires_at = EXCLUDED.expires_at \
                     RETURNING version",
                    t = self.table
                ),
                &[&key, &value, &expires_at],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    /// Remove rows whose TTL has passed; returns how many were deleted
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = Utc::now().timestamp();
        let conn = self.pool.get().await?;
        let affected = conn
            .execute(
                &format!(
                    "DELETE FROM {} WHERE expires_at IS NOT NULL AND expires_at <= $1",
                    self.table
                ),
                &[&now],
            )
            .await?;
        Ok(affected)
    }
}

fn expiry(now: DateTime<Utc>, ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|ttl| now.timestamp() + i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX / 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PoolConfig;

    #[tokio::test]
    async fn test_rejects_unsafe_table_names() {
        // Pool construction is lazy; no database is contacted here.
        let pool = KvPool::new(PoolConfig::default()).await.unwrap();
        assert!(KvTable::new(pool.clone(), "call_carts").is_ok());
        assert!(KvTable::new(pool.clone(), "carts; DROP TABLE x").is_err());
        assert!(KvTable::new(pool, "").is_err());
    }

    #[test]
    fn test_expiry_from_ttl() {
        let now = Utc::now();
        assert_eq!(expiry(now, None), None);
        assert_eq!(
            expiry(now, Some(Duration::from_secs(7200))),
            Some(now.timestamp() + 7200)
        );
    }

    #[tokio::test]
    async fn test_round_trip_against_live_database() {
        // Requires a running LumaDB instance
        let Ok(url) = std::env::var("LUMADB_URL") else {
            return;
        };
        let pool = KvPool::new(PoolConfig {
            url,
            max_size: 2,
            ..PoolConfig::default()
        })
        .await
        .unwrap();
        let table = KvTable::new(pool, "kv_test_entries").unwrap();
        table.ensure_schema().await.unwrap();
        assert!(table.is_healthy().await);
        let key = format!("k-{}", Utc::now().timestamp_micros());

        let v1 = table.put_if_version(&key, "one", 0, Some(Duration::from_secs(60))).await.unwrap();
        assert_eq!(v1, 1);
        let stale = table.put_if_version(&key, "two", 0, None).await;
        assert!(matches!(stale, Err(KvError::VersionConflict { .. })));
        let v2 = table.put_if_version(&key, "two", v1, None).await.unwrap();
        assert_eq!(v2, 2);
        assert_eq!(table.get(&key).await.unwrap().unwrap().value, "two");
    }
}
