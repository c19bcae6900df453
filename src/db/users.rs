// src/db/users.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite};

use crate::models::user::{ExternalProfile, Position, User};

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, external_id, name, email, profile_picture, position, is_pending, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, external_id, name, email, profile_picture, position, is_pending, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

/// Inserts a claimed account from a provider profile.
pub async fn insert_from_profile<'e, E>(
    executor: E,
    profile: &ExternalProfile,
    email: &str,
    position: Position,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (external_id, name, email, profile_picture, position, is_pending, created_at)
        VALUES (?, ?, ?, ?, ?, FALSE, ?)
        RETURNING id, external_id, name, email, profile_picture, position, is_pending, created_at
        "#,
    )
    .bind(&profile.external_id)
    .bind(&profile.name)
    .bind(email)
    .bind(&profile.picture)
    .bind(position)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

/// Inserts a pending student placeholder for an email that has never logged in.
/// Returns `false` if a user with that email already exists.
pub async fn insert_pending_student<'e, E>(executor: E, email: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO users (external_id, name, email, profile_picture, position, is_pending, created_at)
        VALUES (NULL, 'Pending', ?, NULL, 'student', TRUE, ?)
        ON CONFLICT(email) DO NOTHING
        "#,
    )
    .bind(email)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Adopts the provider identity onto a pending placeholder row.
pub async fn claim_pending<'e, E>(
    executor: E,
    id: i64,
    profile: &ExternalProfile,
    position: Position,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET external_id = ?, name = ?, profile_picture = ?, position = ?, is_pending = FALSE
        WHERE id = ? AND is_pending = TRUE
        RETURNING id, external_id, name, email, profile_picture, position, is_pending, created_at
        "#,
    )
    .bind(&profile.external_id)
    .bind(&profile.name)
    .bind(&profile.picture)
    .bind(position)
    .bind(id)
    .fetch_one(executor)
    .await
}

/// Users enrolled in a classroom, in enrollment order.
pub async fn list_by_classroom<'e, E>(executor: E, classroom_id: i64) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.external_id, u.name, u.email, u.profile_picture, u.position, u.is_pending, u.created_at
        FROM classroom_members m
        JOIN users u ON u.email = m.student_email
        WHERE m.classroom_id = ?
        ORDER BY m.id
        "#,
    )
    .bind(classroom_id)
    .fetch_all(executor)
    .await
}
