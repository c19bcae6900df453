// src/services/closer.rs

//! Periodic sweep closing quizzes whose deadline has passed.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{db, error::AppError, utils::session::SessionStore};

/// One sweep: closes every open quiz with `close_at <= now`.
/// Quizzes without a deadline are never touched. Returns how many were closed.
pub async fn close_expired_quizzes(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, AppError> {
    let closed = db::quizzes::close_expired(pool, now).await?;
    if closed > 0 {
        tracing::info!("Closed {} expired quizzes.", closed);
    }
    Ok(closed)
}

/// Spawns the sweep loop. Each tick closes expired quizzes and drops expired
/// sessions; errors are logged and the loop carries on with the next tick.
pub fn spawn(pool: SqlitePool, sessions: Arc<dyn SessionStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let now = Utc::now();

            if let Err(e) = close_expired_quizzes(&pool, now).await {
                tracing::error!("Error closing expired quizzes: {:?}", e);
            }

            match sessions.purge_expired(now).await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!("Purged {} expired sessions", purged),
                Err(e) => tracing::error!("Error purging sessions: {:?}", e),
            }
        }
    })
}
