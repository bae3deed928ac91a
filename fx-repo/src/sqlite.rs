//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, warn};

use fx_types::{
    CachedRate, CurrencyCode, FavoriteConversion, FavoriteId, FavoriteStore, NewFavorite,
    RateStore, RateTable, RepoError,
};

use crate::types::{DbCachedRate, DbFavorite};

/// Bumped whenever the table layout changes. A database stamped with any
/// other non-zero version is dropped and recreated.
pub const SCHEMA_VERSION: i64 = 2;

const CREATE_TABLES: &str = include_str!("../migrations/0001_create_tables.sql");
const RESET_TABLES: &str = include_str!("../migrations/0000_reset.sql");

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

fn tx_err(e: sqlx::Error) -> RepoError {
    RepoError::Transaction(e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        // An in-memory database lives as long as its connections, so keep it on one.
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 4 })
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema, dropping tables written by another
    /// schema version first.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let (version,): (i64,) = sqlx::query_as("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        if version != 0 && version != SCHEMA_VERSION {
            warn!(
                found = version,
                expected = SCHEMA_VERSION,
                "Schema version mismatch, recreating tables"
            );
            sqlx::raw_sql(RESET_TABLES)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }

        sqlx::raw_sql(CREATE_TABLES)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let stamp = format!("PRAGMA user_version = {}", SCHEMA_VERSION);
        sqlx::raw_sql(&stamp)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    /// Reads the schema version stamped on the database.
    pub async fn schema_version(&self) -> Result<i64, RepoError> {
        let (version,): (i64,) = sqlx::query_as("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(version)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteRepo {
    async fn get(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<Option<CachedRate>, RepoError> {
        let row: Option<DbCachedRate> = sqlx::query_as(
            r#"SELECT base, target, rate, fetched_at FROM cached_rates WHERE base = ? AND target = ?"#,
        )
        .bind(base.as_str())
        .bind(target.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbCachedRate::into_domain).transpose()
    }

    async fn get_all_for_base(&self, base: &CurrencyCode) -> Result<Vec<CachedRate>, RepoError> {
        let rows: Vec<DbCachedRate> = sqlx::query_as(
            r#"SELECT base, target, rate, fetched_at FROM cached_rates WHERE base = ? ORDER BY target"#,
        )
        .bind(base.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbCachedRate::into_domain).collect()
    }

    async fn put_many(
        &self,
        base: &CurrencyCode,
        rates: &RateTable,
        fetched_at: i64,
    ) -> Result<usize, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        // Targets missing from the new table must not survive with an old stamp.
        sqlx::query(r#"DELETE FROM cached_rates WHERE base = ?"#)
            .bind(base.as_str())
            .execute(&mut *db_tx)
            .await
            .map_err(db_err)?;

        for (target, rate) in rates.iter() {
            sqlx::query(
                r#"INSERT INTO cached_rates (base, target, rate, fetched_at) VALUES (?, ?, ?, ?)"#,
            )
            .bind(base.as_str())
            .bind(target.as_str())
            .bind(rate)
            .bind(fetched_at)
            .execute(&mut *db_tx)
            .await
            .map_err(db_err)?;
        }

        db_tx.commit().await.map_err(tx_err)?;

        debug!(base = %base, rows = rates.len(), fetched_at, "Cached rates replaced");
        Ok(rates.len())
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, RepoError> {
        let result = sqlx::query(r#"DELETE FROM cached_rates WHERE fetched_at < ?"#)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn clear(&self) -> Result<u64, RepoError> {
        let result = sqlx::query(r#"DELETE FROM cached_rates"#)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Favorites
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl FavoriteStore for SqliteRepo {
    async fn insert(&self, favorite: NewFavorite) -> Result<FavoriteConversion, RepoError> {
        let id = FavoriteId::new();

        sqlx::query(
            r#"INSERT INTO favorite_conversions (id, from_currency, to_currency, amount, result, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(favorite.from.as_str())
        .bind(favorite.to.as_str())
        .bind(favorite.amount)
        .bind(favorite.result)
        .bind(favorite.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(FavoriteConversion::from_new(id, favorite))
    }

    async fn delete(&self, favorite: &FavoriteConversion) -> Result<bool, RepoError> {
        self.delete_by_id(favorite.id).await
    }

    async fn delete_by_id(&self, id: FavoriteId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM favorite_conversions WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self) -> Result<Vec<FavoriteConversion>, RepoError> {
        let rows: Vec<DbFavorite> = sqlx::query_as(
            r#"SELECT id, from_currency, to_currency, amount, result, created_at
               FROM favorite_conversions ORDER BY created_at DESC, rowid DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbFavorite::into_domain).collect()
    }
}
