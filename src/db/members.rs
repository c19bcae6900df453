// src/db/members.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite};

/// Enrolls an email. Returns `false` when it was already enrolled.
pub async fn insert<'e, E>(executor: E, classroom_id: i64, student_email: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO classroom_members (classroom_id, student_email, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(classroom_id, student_email) DO NOTHING
        "#,
    )
    .bind(classroom_id)
    .bind(student_email)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn is_member<'e, E>(executor: E, classroom_id: i64, student_email: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM classroom_members WHERE classroom_id = ? AND student_email = ?",
    )
    .bind(classroom_id)
    .bind(student_email)
    .fetch_optional(executor)
    .await?;

    Ok(row.is_some())
}

pub async fn delete<'e, E>(executor: E, classroom_id: i64, student_email: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "DELETE FROM classroom_members WHERE classroom_id = ? AND student_email = ?",
    )
    .bind(classroom_id)
    .bind(student_email)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_classroom<'e, E>(executor: E, classroom_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM classroom_members WHERE classroom_id = ?")
        .bind(classroom_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
