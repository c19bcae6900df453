// src/handlers/auth.rs

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    config::{OAUTH_STATE_TTL_SECS, SESSION_COOKIE},
    db,
    error::AppError,
    models::user::{Position, User},
    services::identity,
    state::AppState,
    utils::{
        auth::Principal,
        jwt::{sign_state, verify_state},
        session::{SessionData, new_session_id, removal_cookie, session_cookie},
    },
};

/// Where the browser lands after a failed login.
const LOGIN_FAILED_REDIRECT: &str = "/?error=login_failed";

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Starts a Google login.
///
/// Stashes the requested position and a fresh nonce in the session, then
/// redirects to the provider with a signed `state` carrying the nonce.
pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LoginParams>,
) -> Result<impl IntoResponse, AppError> {
    let position: Position = params
        .position
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid position".to_string()))?;

    let ttl = state.config.session_ttl_secs;
    let existing = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state
            .sessions
            .load(cookie.value())
            .await?
            .map(|data| (cookie.value().to_string(), data)),
        None => None,
    };
    let (session_id, mut session) = existing.unwrap_or_else(|| (new_session_id(), SessionData::new(ttl)));

    let nonce = Uuid::new_v4().simple().to_string();
    session.position = Some(position);
    session.oauth_nonce = Some(nonce.clone());
    session.touch(ttl);
    state.sessions.save(&session_id, &session).await?;

    let oauth_state = sign_state(&nonce, &state.config.session_secret, OAUTH_STATE_TTL_SECS)?;
    let authorize_url = state.identity.authorize_url(&oauth_state)?;

    tracing::info!("Starting Google login as {}", position);

    Ok((
        jar.add(session_cookie(session_id, &state.config)),
        Redirect::to(&authorize_url),
    ))
}

/// Completes a Google login and redirects to the landing page for the role.
/// Any failure denies the session.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_login(&state, &jar, params).await {
        Ok((session_id, position)) => {
            let landing = match position {
                Position::Teacher => "/teacher_classroom_list",
                Position::Student => "/student_classroom_list",
            };
            (
                jar.add(session_cookie(session_id, &state.config)),
                Redirect::to(landing),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Login denied: {:?}", e);
            (jar.remove(removal_cookie()), Redirect::to(LOGIN_FAILED_REDIRECT)).into_response()
        }
    }
}

/// Returns the new session id and the role of the logged-in user.
async fn complete_login(
    state: &AppState,
    jar: &CookieJar,
    params: CallbackParams,
) -> Result<(String, Position), AppError> {
    if let Some(error) = params.error {
        return Err(AppError::Forbidden(format!("Provider returned error: {}", error)));
    }

    let pending_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(AppError::unauthorized)?;

    let pending = state
        .sessions
        .load(&pending_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Session expired".to_string()))?;

    let oauth_state = params
        .state
        .ok_or_else(|| AppError::BadRequest("Missing state".to_string()))?;
    let claims = verify_state(&oauth_state, &state.config.session_secret)?;

    if pending.oauth_nonce.as_deref() != Some(claims.nonce.as_str()) {
        return Err(AppError::Forbidden("OAuth state does not match session".to_string()));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing code".to_string()))?;

    // The pre-login session is single use, a replayed callback finds nothing.
    state.sessions.destroy(&pending_id).await?;

    let profile = state.identity.exchange_code(&code).await?;
    let user = identity::reconcile(&state.pool, &profile, pending.position).await?;

    let session_id = new_session_id();
    let mut session = SessionData::new(state.config.session_ttl_secs);
    session.user_id = Some(user.id);
    state.sessions.save(&session_id, &session).await?;

    tracing::info!("User {} logged in as {}", user.id, user.position);
    Ok((session_id, user.position))
}

/// Ends the session and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
    }
    Ok((jar.remove(removal_cookie()), Redirect::to("/")))
}

/// Current user's account.
pub async fn me(
    State(pool): State<SqlitePool>,
    principal: Principal,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&pool, principal.user_id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    Ok(Json(user))
}
