// src/db/responses.rs

use sqlx::{Executor, Sqlite};

use crate::models::quiz_response::QuizResponse;

/// Creates the missing response rows for every (quiz, member) pair of a classroom.
///
/// Idempotent: pairs that already have a row are skipped, so it can run after
/// any membership or quiz change. `max_points` is copied from the quiz.
pub async fn insert_missing_for_classroom<'e, E>(executor: E, classroom_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO quiz_responses (quiz_id, student_email, answered, graded, max_points)
        SELECT q.id, m.student_email, FALSE, FALSE, q.max_points
        FROM quizzes q
        JOIN classroom_members m ON m.classroom_id = q.classroom_id
        WHERE q.classroom_id = ?
          AND NOT EXISTS (
              SELECT 1 FROM quiz_responses r
              WHERE r.quiz_id = q.id AND r.student_email = m.student_email
          )
        "#,
    )
    .bind(classroom_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find<'e, E>(executor: E, quiz_id: i64, student_email: &str) -> Result<Option<QuizResponse>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, QuizResponse>(
        r#"
        SELECT id, quiz_id, student_email, answer, answered, comment, graded, points, max_points
        FROM quiz_responses
        WHERE quiz_id = ? AND student_email = ?
        "#,
    )
    .bind(quiz_id)
    .bind(student_email)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_quiz<'e, E>(executor: E, quiz_id: i64) -> Result<Vec<QuizResponse>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, QuizResponse>(
        r#"
        SELECT id, quiz_id, student_email, answer, answered, comment, graded, points, max_points
        FROM quiz_responses
        WHERE quiz_id = ?
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub async fn list_by_student<'e, E>(executor: E, student_email: &str) -> Result<Vec<QuizResponse>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, QuizResponse>(
        r#"
        SELECT id, quiz_id, student_email, answer, answered, comment, graded, points, max_points
        FROM quiz_responses
        WHERE student_email = ?
        ORDER BY id
        "#,
    )
    .bind(student_email)
    .fetch_all(executor)
    .await
}

/// Records a student's answer. Only matches while the quiz is still open.
pub async fn submit_answer<'e, E>(
    executor: E,
    quiz_id: i64,
    student_email: &str,
    answer: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE quiz_responses
        SET answered = TRUE, answer = ?
        WHERE quiz_id = ? AND student_email = ?
          AND EXISTS (SELECT 1 FROM quizzes q WHERE q.id = quiz_responses.quiz_id AND q.open = TRUE)
        "#,
    )
    .bind(answer)
    .bind(quiz_id)
    .bind(student_email)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Withdraws a submission. The answer text is kept as a draft.
pub async fn unsubmit_answer<'e, E>(executor: E, quiz_id: i64, student_email: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE quiz_responses
        SET answered = FALSE
        WHERE quiz_id = ? AND student_email = ?
          AND EXISTS (SELECT 1 FROM quizzes q WHERE q.id = quiz_responses.quiz_id AND q.open = TRUE)
        "#,
    )
    .bind(quiz_id)
    .bind(student_email)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn submit_grade<'e, E>(
    executor: E,
    quiz_id: i64,
    student_email: &str,
    comment: &str,
    points: i64,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE quiz_responses
        SET graded = TRUE, comment = ?, points = ?
        WHERE quiz_id = ? AND student_email = ?
        "#,
    )
    .bind(comment)
    .bind(points)
    .bind(quiz_id)
    .bind(student_email)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Withdraws a grade. Comment and points are kept.
pub async fn unsubmit_grade<'e, E>(executor: E, quiz_id: i64, student_email: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE quiz_responses SET graded = FALSE WHERE quiz_id = ? AND student_email = ?",
    )
    .bind(quiz_id)
    .bind(student_email)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_quiz<'e, E>(executor: E, quiz_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM quiz_responses WHERE quiz_id = ?")
        .bind(quiz_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes one student's responses for the quizzes of one classroom.
pub async fn delete_for_student_in_classroom<'e, E>(
    executor: E,
    classroom_id: i64,
    student_email: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM quiz_responses
        WHERE student_email = ?
          AND quiz_id IN (SELECT id FROM quizzes WHERE classroom_id = ?)
        "#,
    )
    .bind(student_email)
    .bind(classroom_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_classroom<'e, E>(executor: E, classroom_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "DELETE FROM quiz_responses WHERE quiz_id IN (SELECT id FROM quizzes WHERE classroom_id = ?)",
    )
    .bind(classroom_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
