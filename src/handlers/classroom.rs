// src/handlers/classroom.rs

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
    models::classroom::{AddStudentsRequest, CreateClassroomRequest},
    services::classrooms,
    utils::auth::{Principal, Teacher},
};

/// Classrooms owned by the calling teacher.
pub async fn list_teaching(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(classrooms::list_teaching(&pool, &teacher).await?))
}

/// Classrooms the caller's email is enrolled in.
pub async fn list_enrolled(
    State(pool): State<SqlitePool>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(classrooms::list_enrolled(&pool, &principal).await?))
}

pub async fn create_classroom(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Json(payload): Json<CreateClassroomRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let classroom = classrooms::add_classroom(&pool, &teacher, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

/// Deletes the classroom with everything hanging off it.
pub async fn delete_classroom(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let removed = classrooms::remove_classroom(&pool, &teacher, id).await?;
    Ok(Json(json!({
        "message": "Classroom removed successfully",
        "removed": removed
    })))
}

pub async fn list_students(
    State(pool): State<SqlitePool>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(classrooms::list_students(&pool, &principal, id).await?))
}

/// Bulk enrollment by email.
pub async fn add_students(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(id): Path<i64>,
    Json(payload): Json<AddStudentsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = classrooms::add_students(&pool, &teacher, id, &payload.students).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn remove_student(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path((id, email)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let responses_removed = classrooms::remove_student(&pool, &teacher, id, &email).await?;
    Ok(Json(json!({
        "message": "Student removed successfully",
        "responses_removed": responses_removed
    })))
}
