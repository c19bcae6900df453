// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Kind of answer a quiz expects. Only affects how the client renders the answer box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QuizType {
    Plaintext,
    Code,
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub classroom_id: i64,
    pub name: String,

    /// Question text shown to students (sanitized HTML).
    pub question: String,

    pub quiz_type: QuizType,
    pub max_points: i64,

    /// Quizzes start open. Once closed they stay closed.
    pub open: bool,

    /// Deadline for the scheduled closer. `None` means the quiz never auto-closes.
    pub close_at: Option<chrono::DateTime<chrono::Utc>>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new quiz in a classroom.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Quiz name length must be between 1 and 200 characters."
    ))]
    pub name: String,
    #[validate(length(min = 1, max = 10000))]
    pub question: String,
    pub quiz_type: QuizType,
    #[validate(range(min = 0, max = 100000, message = "max_points must not be negative."))]
    pub max_points: i64,
    #[serde(default)]
    pub close_at: Option<chrono::DateTime<chrono::Utc>>,
}
