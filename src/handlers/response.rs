// src/handlers/response.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz_response::{
        ResponseQuery, ResponsesByQuizzesQuery, ResponsesByStudentsQuery, SubmitAnswerRequest,
        SubmitGradeRequest, UngradeQuery,
    },
    services::quizzes,
    utils::auth::{Principal, Student, Teacher},
};

/// Splits a comma separated query value, ignoring blanks.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, AppError> {
    split_list(raw)
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("Invalid quiz id: {}", s)))
        })
        .collect()
}

pub fn parse_email_list(raw: &str) -> Vec<String> {
    split_list(raw).map(str::to_string).collect()
}

/// A single response. Students get their own, teachers pass `?student=`.
pub async fn get_response(
    State(pool): State<SqlitePool>,
    principal: Principal,
    Path(quiz_id): Path<i64>,
    Query(query): Query<ResponseQuery>,
) -> Result<impl IntoResponse, AppError> {
    let response = quizzes::get_response(&pool, &principal, quiz_id, query.student.as_deref()).await?;
    Ok(Json(response))
}

/// Responses of one quiz for a list of students, `null` where none exists.
pub async fn responses_by_students(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(quiz_id): Path<i64>,
    Query(query): Query<ResponsesByStudentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let emails = parse_email_list(&query.students);
    let responses = quizzes::responses_for_students(&pool, &teacher, quiz_id, &emails).await?;
    Ok(Json(responses))
}

/// The caller's responses for a list of quizzes.
pub async fn responses_by_quizzes(
    State(pool): State<SqlitePool>,
    principal: Principal,
    Query(query): Query<ResponsesByQuizzesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_ids = parse_id_list(&query.quiz_ids)?;
    let responses = quizzes::responses_for_quizzes(&pool, &principal, &quiz_ids).await?;
    Ok(Json(responses))
}

pub async fn submit_answer(
    State(pool): State<SqlitePool>,
    Student(student): Student,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    quizzes::submit_answer(&pool, &student, quiz_id, &payload.answer).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Submitted successfully" })),
    ))
}

pub async fn unsubmit_answer(
    State(pool): State<SqlitePool>,
    Student(student): Student,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    quizzes::unsubmit_answer(&pool, &student, quiz_id).await?;
    Ok(Json(json!({ "message": "Unsubmitted successfully" })))
}

pub async fn submit_grade(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitGradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    quizzes::submit_grade(
        &pool,
        &teacher,
        quiz_id,
        &payload.student_email,
        &payload.comment,
        payload.points,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Graded successfully" })),
    ))
}

pub async fn unsubmit_grade(
    State(pool): State<SqlitePool>,
    Teacher(teacher): Teacher,
    Path(quiz_id): Path<i64>,
    Query(query): Query<UngradeQuery>,
) -> Result<impl IntoResponse, AppError> {
    quizzes::unsubmit_grade(&pool, &teacher, quiz_id, &query.student).await?;
    Ok(Json(json!({ "message": "Ungraded successfully" })))
}
