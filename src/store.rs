//! Store handle and database lifecycle: create the database file, open the pool, close it.

use crate::error::AppError;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::str::FromStr;

/// Create the SQLite database file if it does not exist. No-op for in-memory URLs.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    if database_url.contains(":memory:") {
        return Ok(());
    }
    if !Sqlite::database_exists(database_url).await? {
        tracing::info!(url = %database_url, "database not found, creating");
        Sqlite::create_database(database_url).await?;
    }
    Ok(())
}

/// The entity store: a cloneable handle over the connection pool, built once at startup
/// and passed to every handler.
#[derive(Clone, Debug)]
pub struct EntityStore {
    pool: SqlitePool,
}

impl EntityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool with foreign keys enforced.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if database_url.contains(":memory:") {
            // an in-memory database lives only as long as its connection
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        Ok(Self::new(pool))
    }

    /// Fresh in-memory store with the schema applied. A single connection keeps one database alive.
    pub async fn in_memory() -> Result<Self, AppError> {
        let store = Self::connect("sqlite::memory:", 1).await?;
        crate::migration::apply_schema(store.pool()).await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("entity store closed");
    }
}
