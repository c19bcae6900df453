// tests/common/mod.rs

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use quizroom::{
    config::{Config, SESSION_COOKIE, SessionBackend},
    error::AppError,
    models::user::{ExternalProfile, Position},
    routes,
    services::identity,
    state::AppState,
    utils::{auth::Principal, oauth::IdentityProvider},
};
use reqwest::{header, redirect::Policy};
use sqlx::SqlitePool;
use url::Url;

/// Offline identity provider. The authorization `code` is the email to log in
/// as; `no-email` yields a profile without an email.
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params("https://accounts.test/authorize", &[("state", state)])
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AppError> {
        let email = (code != "no-email").then(|| code.to_string());
        Ok(ExternalProfile {
            external_id: format!("google-{}", code),
            name: format!("User {}", code),
            email,
            picture: None,
        })
    }
}

#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        port: 0,
        google_client_id: "test-client".to_string(),
        google_client_secret: "test-secret".to_string(),
        oauth_redirect_url: "http://127.0.0.1/auth/google/callback".to_string(),
        session_secret: "test_secret_for_integration_tests".to_string(),
        session_backend: SessionBackend::Memory,
        session_ttl_secs: 600,
        cookie_secure: false,
        sweep_interval_secs: 60,
        allowed_origins: vec!["http://localhost:5173".to_string()],
    }
}

/// Fresh in-memory store with migrations applied.
#[allow(dead_code)]
pub async fn test_pool() -> SqlitePool {
    quizroom::db::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

/// File-backed store in the temp dir, opened the way the server opens it.
/// Returns the pool and the database path for cleanup.
#[allow(dead_code)]
pub async fn file_pool() -> (SqlitePool, PathBuf) {
    let path = std::env::temp_dir().join(format!("quizroom-{}.db", uuid::Uuid::new_v4().simple()));
    let config = Config {
        database_url: format!("sqlite://{}", path.display()),
        ..test_config()
    };
    let pool = quizroom::db::connect(&config)
        .await
        .expect("Failed to open file database");
    (pool, path)
}

/// Removes a database created by `file_pool`, WAL files included.
#[allow(dead_code)]
pub fn remove_database(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

/// Builds the router over a fresh store, for `oneshot` tests.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, AppState) {
    create_test_app_with(test_config()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with(config: Config) -> (axum::Router, AppState) {
    let state = AppState::new(test_pool().await, config, Arc::new(StubProvider));
    (routes::create_router(state.clone()), state)
}

/// Spawns the app on a random port.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the pool behind it.
#[allow(dead_code)]
pub async fn spawn_app() -> (String, SqlitePool) {
    spawn_app_with(test_config()).await
}

#[allow(dead_code)]
pub async fn spawn_app_with(config: Config) -> (String, SqlitePool) {
    let (app, state) = create_test_app_with(config).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, state.pool)
}

/// Client that reports redirects instead of following them.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// `name=value` of the session cookie set by a response, if any.
#[allow(dead_code)]
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", SESSION_COOKIE)))
        .map(str::to_string)
}

#[allow(dead_code)]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Runs the whole login round trip and returns the callback response.
#[allow(dead_code)]
pub async fn login_response(address: &str, code: &str, position: &str) -> reqwest::Response {
    let client = client();

    let start = client
        .get(format!("{}/auth/google?position={}", address, position))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(start.status().as_u16(), 303);

    let cookie = session_cookie(&start).expect("Login start did not set a session");
    let authorize = Url::parse(&location(&start)).unwrap();
    let state = authorize
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("Missing state in authorize URL");

    let callback = Url::parse_with_params(
        &format!("{}/auth/google/callback", address),
        &[("code", code), ("state", state.as_str())],
    )
    .unwrap();

    client
        .get(callback)
        .header(header::COOKIE, cookie)
        .send()
        .await
        .expect("Failed to execute request")
}

/// Logs in through the HTTP flow and returns the session cookie to send back.
#[allow(dead_code)]
pub async fn login(address: &str, email: &str, position: &str) -> String {
    let response = login_response(address, email, position).await;
    assert_eq!(response.status().as_u16(), 303);
    assert_ne!(location(&response), "/?error=login_failed");
    session_cookie(&response).expect("Login did not set a session")
}

/// Creates (or reuses) the account and returns it as a request principal.
#[allow(dead_code)]
pub async fn principal(pool: &SqlitePool, email: &str, position: Position) -> Principal {
    let profile = ExternalProfile {
        external_id: format!("google-{}", email),
        name: format!("User {}", email),
        email: Some(email.to_string()),
        picture: None,
    };
    let user = identity::reconcile(pool, &profile, Some(position))
        .await
        .expect("Failed to reconcile user");

    Principal {
        user_id: user.id,
        external_id: user.external_id.expect("Reconciled user has no external id"),
        email: user.email,
        position: user.position,
    }
}
