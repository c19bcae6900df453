// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::CreateQuizRequest,
    services::quizzes,
    utils::auth::{Principal, Teacher},
};

/// All quizzes of a classroom. Owner or members only.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    principal: Principal,
    Path(classroom_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(quizzes::list_by_classroom(&pool, &principal, classroom_id).await?))
}

/// Quizzes of a classroom assigned to the caller.
pub async fn list_my_quizzes(
    State(pool): State<SqlitePool>,
    principal: Principal,
    Path(classroom_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(quizzes::list_assigned(&pool, &principal, classroom_id).await?))
}

/// Creates a quiz and assigns it to the classroom's current students.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(classroom_id): Path<i64>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quiz = quizzes::add_quiz(&pool, &teacher, classroom_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(quizzes::get_quiz(&pool, &principal, id).await?))
}

pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let responses_removed = quizzes::remove_quiz(&pool, &teacher, id).await?;
    Ok(Json(json!({
        "message": "Quiz removed successfully",
        "responses_removed": responses_removed
    })))
}

pub async fn close_quiz(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    quizzes::close_quiz(&pool, &teacher, id).await?;
    Ok(Json(json!({ "message": "Quiz successfully closed" })))
}
