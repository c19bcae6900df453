// src/models/quiz_response.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_responses' table: one student's answer and grade for one quiz.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: i64,
    pub quiz_id: i64,
    pub student_email: String,

    /// Kept when the student unsubmits.
    pub answer: Option<String>,
    pub answered: bool,

    pub comment: Option<String>,
    pub graded: bool,
    pub points: Option<i64>,

    /// Copied from the quiz when the response is created.
    pub max_points: i64,
}

/// DTO for a student submitting an answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(max = 100000, message = "Answer is too long."))]
    pub answer: String,
}

/// DTO for a teacher grading one student's response.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitGradeRequest {
    #[validate(email)]
    pub student_email: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub comment: String,
    #[validate(range(min = 0, message = "Points must not be negative."))]
    pub points: i64,
}

/// Query for reading a single response. Ignored for students, who always read their own.
#[derive(Debug, Deserialize)]
pub struct ResponseQuery {
    pub student: Option<String>,
}

/// Query for reading many responses of one quiz by student emails (comma separated).
#[derive(Debug, Deserialize)]
pub struct ResponsesByStudentsQuery {
    pub students: String,
}

/// Query for reading the caller's responses for many quizzes (comma separated ids).
#[derive(Debug, Deserialize)]
pub struct ResponsesByQuizzesQuery {
    pub quiz_ids: String,
}

/// Query naming the student whose grade is withdrawn.
#[derive(Debug, Deserialize)]
pub struct UngradeQuery {
    pub student: String,
}
