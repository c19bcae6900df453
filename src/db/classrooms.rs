// src/db/classrooms.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite};

use crate::models::classroom::Classroom;

pub async fn insert<'e, E>(executor: E, name: &str, owner_external_id: &str) -> Result<Classroom, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Classroom>(
        r#"
        INSERT INTO classrooms (name, owner_external_id, created_at)
        VALUES (?, ?, ?)
        RETURNING id, name, owner_external_id, created_at
        "#,
    )
    .bind(name)
    .bind(owner_external_id)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Classroom>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Classroom>(
        "SELECT id, name, owner_external_id, created_at FROM classrooms WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_owner<'e, E>(executor: E, owner_external_id: &str) -> Result<Vec<Classroom>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Classroom>(
        r#"
        SELECT id, name, owner_external_id, created_at
        FROM classrooms
        WHERE owner_external_id = ?
        ORDER BY id
        "#,
    )
    .bind(owner_external_id)
    .fetch_all(executor)
    .await
}

/// Classrooms the given student email is enrolled in.
pub async fn list_by_student<'e, E>(executor: E, student_email: &str) -> Result<Vec<Classroom>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Classroom>(
        r#"
        SELECT c.id, c.name, c.owner_external_id, c.created_at
        FROM classroom_members m
        JOIN classrooms c ON c.id = m.classroom_id
        WHERE m.student_email = ?
        ORDER BY c.id
        "#,
    )
    .bind(student_email)
    .fetch_all(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM classrooms WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
