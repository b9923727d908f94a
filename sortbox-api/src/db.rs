//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres and the
//! [`PgArrayStore`] implementation of [`ArrayStore`].

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use sortbox_core::{
    format_array, parse_array, plan_reindex, ArrayId, ArrayRecord, ReindexPlan, SortboxResult,
    StorageError, Timestamp,
};
use sortbox_storage::ArrayStore;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

/// Schema applied by [`PgArrayStore::ensure_schema`].
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait timeout when acquiring a connection
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "sortbox".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SORTBOX_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SORTBOX_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("SORTBOX_DB_NAME").unwrap_or_else(|_| "sortbox".to_string()),
            user: std::env::var("SORTBOX_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("SORTBOX_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("SORTBOX_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("SORTBOX_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn pool_error(err: PoolError) -> StorageError {
    tracing::error!("Connection pool error: {:?}", err);
    match err {
        PoolError::Timeout(_) => StorageError::Unavailable {
            reason: "connection pool exhausted".to_string(),
        },
        PoolError::Closed => StorageError::Unavailable {
            reason: "connection pool is closed".to_string(),
        },
        other => StorageError::Backend {
            reason: format!("failed to acquire connection: {}", other),
        },
    }
}

fn backend(err: tokio_postgres::Error) -> StorageError {
    tracing::error!("Database error: {:?}", err);
    StorageError::Backend {
        reason: err.to_string(),
    }
}

fn tx_failed(err: tokio_postgres::Error) -> StorageError {
    tracing::error!("Reindex transaction error: {:?}", err);
    StorageError::TransactionFailed {
        reason: err.to_string(),
    }
}

// ============================================================================
// POSTGRES ARRAY STORE
// ============================================================================

/// [`ArrayStore`] backed by the `arrays` table.
#[derive(Clone)]
pub struct PgArrayStore {
    pool: Pool,
}

impl PgArrayStore {
    /// Create a new store with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration and make sure the schema exists.
    ///
    /// Fails when the database cannot be reached.
    pub async fn connect(config: &DbConfig) -> ApiResult<Self> {
        let store = Self::new(config.create_pool()?);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Apply [`SCHEMA_SQL`].
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::info!("Database schema ready");
        Ok(())
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> Result<deadpool_postgres::Object, StorageError> {
        self.pool.get().await.map_err(pool_error)
    }

    fn row_to_record(row: &Row) -> Result<ArrayRecord, StorageError> {
        let id: ArrayId = row.try_get("id").map_err(backend)?;
        let text: String = row.try_get("array_data").map_err(backend)?;
        let data = parse_array(&text).map_err(|e| StorageError::CorruptRecord {
            id,
            reason: e.to_string(),
        })?;

        Ok(ArrayRecord {
            id,
            data,
            is_sorted: row.try_get("is_sorted").map_err(backend)?,
            created_at: row.try_get("created_at").map_err(backend)?,
        })
    }
}

#[async_trait]
impl ArrayStore for PgArrayStore {
    async fn insert(&self, data: &[i64], is_sorted: bool) -> SortboxResult<ArrayId> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO arrays (array_data, is_sorted) VALUES ($1, $2) RETURNING id",
                &[&format_array(data), &is_sorted],
            )
            .await
            .map_err(|e| StorageError::InsertFailed {
                reason: e.to_string(),
            })?;

        Ok(row.try_get(0).map_err(backend)?)
    }

    async fn list(&self) -> SortboxResult<Vec<ArrayRecord>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT id, array_data, is_sorted, created_at FROM arrays ORDER BY id",
                &[],
            )
            .await
            .map_err(backend)?;

        Ok(rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn get(&self, id: ArrayId) -> SortboxResult<Option<ArrayRecord>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, array_data, is_sorted, created_at FROM arrays WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(backend)?;

        Ok(row.as_ref().map(Self::row_to_record).transpose()?)
    }

    async fn load(&self, id: ArrayId) -> SortboxResult<String> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT array_data FROM arrays WHERE id = $1", &[&id])
            .await
            .map_err(backend)?
            .ok_or(StorageError::NotFound { id })?;

        Ok(row.try_get(0).map_err(backend)?)
    }

    async fn update(&self, id: ArrayId, data: &[i64], is_sorted: bool) -> SortboxResult<()> {
        let conn = self.get_conn().await?;
        let updated = conn
            .execute(
                "UPDATE arrays SET array_data = $2, is_sorted = $3 WHERE id = $1",
                &[&id, &format_array(data), &is_sorted],
            )
            .await
            .map_err(|e| StorageError::UpdateFailed {
                id,
                reason: e.to_string(),
            })?;

        if updated == 0 {
            return Err(StorageError::NotFound { id }.into());
        }
        Ok(())
    }

    async fn delete(&self, id: ArrayId) -> SortboxResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM arrays WHERE id = $1", &[&id])
            .await
            .map_err(|e| StorageError::DeleteFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(deleted > 0)
    }

    async fn reindex(&self) -> SortboxResult<ReindexPlan> {
        let mut conn = self.get_conn().await?;
        // Dropping `tx` without commit rolls back.
        let tx = conn.transaction().await.map_err(tx_failed)?;

        // Blocks writers and other reindexers until commit; plain reads proceed.
        tx.batch_execute("LOCK TABLE arrays IN SHARE ROW EXCLUSIVE MODE")
            .await
            .map_err(tx_failed)?;

        let rows = tx
            .query("SELECT id, created_at FROM arrays", &[])
            .await
            .map_err(tx_failed)?;
        let current = rows
            .iter()
            .map(|row| {
                Ok((
                    row.try_get::<_, ArrayId>(0)?,
                    row.try_get::<_, Timestamp>(1)?,
                ))
            })
            .collect::<Result<Vec<_>, tokio_postgres::Error>>()
            .map_err(tx_failed)?;

        let plan = plan_reindex(current);

        if !plan.is_noop() {
            let old_ids: Vec<ArrayId> = plan.remaps.iter().map(|r| r.old_id).collect();
            let new_ids: Vec<ArrayId> = plan.remaps.iter().map(|r| r.new_id).collect();

            // Park moving rows on negative ids so no step hits a live key.
            tx.execute("UPDATE arrays SET id = -id WHERE id = ANY($1)", &[&old_ids])
                .await
                .map_err(tx_failed)?;
            tx.execute(
                "UPDATE arrays AS a SET id = m.new_id \
                 FROM UNNEST($1::bigint[], $2::bigint[]) AS m(old_id, new_id) \
                 WHERE a.id = -m.old_id",
                &[&old_ids, &new_ids],
            )
            .await
            .map_err(tx_failed)?;
        }

        tx.query_one(
            "SELECT setval(pg_get_serial_sequence('arrays', 'id'), $1, false)",
            &[&plan.next_id()],
        )
        .await
        .map_err(tx_failed)?;

        tx.commit().await.map_err(tx_failed)?;

        tracing::debug!(
            total = plan.total,
            remapped = plan.remaps.len(),
            "Reindex committed"
        );
        Ok(plan)
    }

    async fn clear(&self) -> SortboxResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute("TRUNCATE arrays RESTART IDENTITY")
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn count(&self) -> SortboxResult<usize> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one("SELECT COUNT(*) FROM arrays", &[])
            .await
            .map_err(backend)?;
        let count: i64 = row.try_get(0).map_err(backend)?;
        Ok(count.max(0) as usize)
    }

    async fn ping(&self) -> SortboxResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "sortbox");
        assert_eq!(config.max_size, 16);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_create_pool_is_lazy() -> ApiResult<()> {
        // No connection is attempted until the first checkout.
        let pool = DbConfig::default().create_pool()?;
        assert_eq!(pool.status().max_size, 16);
        Ok(())
    }

    #[test]
    fn test_pool_error_mapping() {
        assert!(matches!(
            pool_error(PoolError::Closed),
            StorageError::Unavailable { .. }
        ));
    }

    #[test]
    fn test_schema_is_idempotent() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS arrays"));
        assert!(SCHEMA_SQL.contains("CREATE INDEX IF NOT EXISTS"));
    }
}
