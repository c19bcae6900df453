// src/db/quizzes.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

use crate::models::quiz::{Quiz, QuizType};

/// Column values for a new quiz. Quizzes are always created open.
#[derive(Debug, Clone)]
pub struct NewQuiz<'a> {
    pub classroom_id: i64,
    pub name: &'a str,
    pub question: &'a str,
    pub quiz_type: QuizType,
    pub max_points: i64,
    pub close_at: Option<DateTime<Utc>>,
}

pub async fn insert<'e, E>(executor: E, quiz: &NewQuiz<'_>) -> Result<Quiz, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (classroom_id, name, question, quiz_type, max_points, open, close_at, created_at)
        VALUES (?, ?, ?, ?, ?, TRUE, ?, ?)
        RETURNING id, classroom_id, name, question, quiz_type, max_points, open, close_at, created_at
        "#,
    )
    .bind(quiz.classroom_id)
    .bind(quiz.name)
    .bind(quiz.question)
    .bind(quiz.quiz_type)
    .bind(quiz.max_points)
    .bind(quiz.close_at)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, classroom_id, name, question, quiz_type, max_points, open, close_at, created_at
        FROM quizzes
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_classroom<'e, E>(executor: E, classroom_id: i64) -> Result<Vec<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, classroom_id, name, question, quiz_type, max_points, open, close_at, created_at
        FROM quizzes
        WHERE classroom_id = ?
        ORDER BY id
        "#,
    )
    .bind(classroom_id)
    .fetch_all(executor)
    .await
}

/// Quizzes of a classroom that have a response row for the given student.
pub async fn list_assigned<'e, E>(
    executor: E,
    classroom_id: i64,
    student_email: &str,
) -> Result<Vec<Quiz>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT q.id, q.classroom_id, q.name, q.question, q.quiz_type, q.max_points, q.open, q.close_at, q.created_at
        FROM quiz_responses r
        JOIN quizzes q ON q.id = r.quiz_id
        WHERE q.classroom_id = ? AND r.student_email = ?
        ORDER BY q.id
        "#,
    )
    .bind(classroom_id)
    .bind(student_email)
    .fetch_all(executor)
    .await
}

/// Marks a quiz closed regardless of its deadline.
pub async fn close<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE quizzes SET open = FALSE WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Closes every open quiz whose deadline is at or before `now`.
///
/// Timestamps are compared through `julianday` so differing fractional-second
/// precision in the stored text does not affect ordering.
pub async fn close_expired<'e, E>(executor: E, now: DateTime<Utc>) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE quizzes
        SET open = FALSE
        WHERE open = TRUE
          AND close_at IS NOT NULL
          AND julianday(close_at) <= julianday(?)
        "#,
    )
    .bind(now)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_classroom<'e, E>(executor: E, classroom_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM quizzes WHERE classroom_id = ?")
        .bind(classroom_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
