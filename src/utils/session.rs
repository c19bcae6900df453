// src/utils/session.rs

//! Server-side sessions keyed by an opaque cookie.

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    config::{Config, SESSION_COOKIE},
    error::AppError,
    models::user::Position,
};

/// Everything kept on the server for one browser session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Set once login completes.
    pub user_id: Option<i64>,
    /// Role chosen on the login page, only held during the OAuth round trip.
    pub position: Option<Position>,
    /// Matches the nonce inside the signed OAuth `state`.
    pub oauth_nonce: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            user_id: None,
            position: None,
            oauth_nonce: None,
            expires_at: Utc::now() + Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Pushes the expiry forward on activity.
    pub fn touch(&mut self, ttl_secs: u64) {
        self.expires_at = Utc::now() + Duration::seconds(ttl_secs as i64);
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` for unknown and expired sessions.
    async fn load(&self, id: &str) -> Result<Option<SessionData>, AppError>;
    async fn save(&self, id: &str, data: &SessionData) -> Result<(), AppError>;
    async fn destroy(&self, id: &str) -> Result<(), AppError>;
    /// Drops sessions that expired at or before `now`, returning how many.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// Process-local store for development. Sessions do not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<String, SessionData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, AppError> {
        let data = self.sessions.get(id).map(|entry| entry.value().clone());
        match data {
            Some(data) if data.is_expired(Utc::now()) => {
                self.sessions.remove(id);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn save(&self, id: &str, data: &SessionData) -> Result<(), AppError> {
        self.sessions.insert(id.to_string(), data.clone());
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), AppError> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let before = self.sessions.len();
        self.sessions.retain(|_, data| !data.is_expired(now));
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }
}

/// Store backed by the `sessions` table, shared by every process using the database.
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqlStore {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some((raw,)) = row else {
            return Ok(None);
        };

        let data: SessionData = serde_json::from_str(&raw)
            .map_err(|e| AppError::InternalServerError(format!("Corrupt session {}: {}", id, e)))?;

        if data.is_expired(Utc::now()) {
            self.destroy(id).await?;
            return Ok(None);
        }
        Ok(Some(data))
    }

    async fn save(&self, id: &str, data: &SessionData) -> Result<(), AppError> {
        let raw = serde_json::to_string(data)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, data, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data, expires_at = excluded.expires_at
            "#,
        )
        .bind(id)
        .bind(raw)
        .bind(data.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE julianday(expires_at) <= julianday(?)")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Fresh opaque session id.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Cookie carrying the session id.
pub fn session_cookie(id: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(config.session_ttl_secs as i64))
        .build()
}

/// Cookie that makes the browser drop the session id.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
