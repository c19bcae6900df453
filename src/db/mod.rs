// src/db/mod.rs

//! Entity store: pool construction and per-table accessors.
//!
//! Accessors are free functions generic over `sqlx::Executor`, so the same
//! call works against the pool or inside a transaction (`&mut *tx`).

pub mod classrooms;
pub mod members;
pub mod quizzes;
pub mod responses;
pub mod users;

use std::{str::FromStr, time::Duration};

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::config::Config;

const CONNECT_ATTEMPTS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the pool (retrying while the store is not ready) and applies migrations.
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let mut retry_count = 0;
    let pool = loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count >= CONNECT_ATTEMPTS {
                    return Err(e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");
    migrate(&pool).await?;
    Ok(pool)
}

/// Starts a transaction holding the write lock from its first statement.
/// Concurrent read-then-write cascades wait on the busy timeout instead of
/// failing the lock upgrade with `SQLITE_BUSY`.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Applies the embedded migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations applied successfully.");
    Ok(())
}

/// Single-connection in-memory store. The connection is never recycled,
/// otherwise the database would vanish with it.
pub async fn in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}
