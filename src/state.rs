use std::sync::Arc;

use crate::config::{Config, SessionBackend};
use crate::utils::{
    oauth::IdentityProvider,
    session::{MemoryStore, SessionStore, SqlStore},
};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Builds the state, picking the session backend from the configuration.
    pub fn new(pool: SqlitePool, config: Config, identity: Arc<dyn IdentityProvider>) -> Self {
        let sessions: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Memory => Arc::new(MemoryStore::new()),
            SessionBackend::Database => Arc::new(SqlStore::new(pool.clone())),
        };

        Self {
            pool,
            config,
            sessions,
            identity,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
