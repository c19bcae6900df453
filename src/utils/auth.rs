// src/utils/auth.rs

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    config::SESSION_COOKIE,
    db,
    error::AppError,
    models::user::Position,
    state::AppState,
};

/// The logged-in user, resolved once per request by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i64,
    /// Google id. Classrooms are owned by this value.
    pub external_id: String,
    pub email: String,
    pub position: Position,
}

/// Principal that is known to be a teacher.
#[derive(Debug, Clone)]
pub struct Teacher(pub Principal);

/// Principal that is known to be a student.
#[derive(Debug, Clone)]
pub struct Student(pub Principal);

/// Axum Middleware: Authentication.
///
/// Resolves the session cookie to a live session with a logged-in user,
/// re-reads that user and injects a `Principal` into the request extensions.
/// Any missing piece yields 403.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(AppError::unauthorized)?;

    let mut session = state
        .sessions
        .load(&session_id)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    let user_id = session.user_id.ok_or_else(AppError::unauthorized)?;

    let user = db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    let external_id = user.external_id.ok_or_else(AppError::unauthorized)?;

    session.touch(state.config.session_ttl_secs);
    state.sessions.save(&session_id, &session).await?;

    req.extensions_mut().insert(Principal {
        user_id: user.id,
        external_id,
        email: user.email,
        position: user.position,
    });

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}

impl<S> FromRequestParts<S> for Teacher
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if principal.position != Position::Teacher {
            return Err(AppError::unauthorized());
        }
        Ok(Teacher(principal))
    }
}

impl<S> FromRequestParts<S> for Student
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if principal.position != Position::Student {
            return Err(AppError::unauthorized());
        }
        Ok(Student(principal))
    }
}
