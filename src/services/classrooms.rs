// src/services/classrooms.rs

//! Classroom lifecycle and enrollment. Every multi-step change runs in one
//! transaction.

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Executor};

use crate::{
    db,
    error::AppError,
    models::{
        classroom::{AddStudentsResponse, Classroom},
        user::{Position, User, normalize_email},
    },
    utils::auth::Principal,
};

/// Row counts removed by a classroom deletion.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RemovedClassroom {
    pub quizzes: u64,
    pub members: u64,
    pub responses: u64,
}

/// Fills in the missing responses so every (quiz, member) pair of the
/// classroom has exactly one. Safe to call any number of times.
pub async fn ensure_responses<'e, E>(executor: E, classroom_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created = db::responses::insert_missing_for_classroom(executor, classroom_id).await?;
    if created > 0 {
        tracing::debug!("Created {} quiz responses in classroom {}", created, classroom_id);
    }
    Ok(created)
}

/// Loads the classroom and checks the principal owns it.
pub async fn require_owner(
    conn: &mut SqliteConnection,
    classroom_id: i64,
    principal: &Principal,
) -> Result<Classroom, AppError> {
    let classroom = db::classrooms::find_by_id(&mut *conn, classroom_id)
        .await?
        .ok_or_else(|| AppError::OperationFailed("Classroom not found".to_string()))?;

    if classroom.owner_external_id != principal.external_id {
        return Err(AppError::Forbidden("Not the owner of this classroom".to_string()));
    }
    Ok(classroom)
}

/// Loads the classroom and checks the principal owns it or is enrolled in it.
pub async fn require_viewer(
    conn: &mut SqliteConnection,
    classroom_id: i64,
    principal: &Principal,
) -> Result<Classroom, AppError> {
    let classroom = db::classrooms::find_by_id(&mut *conn, classroom_id)
        .await?
        .ok_or_else(|| AppError::OperationFailed("Classroom not found".to_string()))?;

    let allowed = match principal.position {
        Position::Teacher => classroom.owner_external_id == principal.external_id,
        Position::Student => db::members::is_member(&mut *conn, classroom_id, &principal.email).await?,
    };

    if !allowed {
        return Err(AppError::Forbidden("Not a member of this classroom".to_string()));
    }
    Ok(classroom)
}

pub async fn add_classroom(pool: &SqlitePool, owner: &Principal, name: &str) -> Result<Classroom, AppError> {
    let classroom = db::classrooms::insert(pool, name.trim(), &owner.external_id).await?;
    tracing::info!("Classroom {} created by {}", classroom.id, owner.email);
    Ok(classroom)
}

/// Deletes a classroom with its responses, memberships and quizzes.
pub async fn remove_classroom(
    pool: &SqlitePool,
    owner: &Principal,
    classroom_id: i64,
) -> Result<RemovedClassroom, AppError> {
    let mut tx = db::begin_write(pool).await?;

    require_owner(&mut tx, classroom_id, owner).await?;

    let responses = db::responses::delete_by_classroom(&mut *tx, classroom_id).await?;
    let members = db::members::delete_by_classroom(&mut *tx, classroom_id).await?;
    let quizzes = db::quizzes::delete_by_classroom(&mut *tx, classroom_id).await?;
    let removed = db::classrooms::delete(&mut *tx, classroom_id).await?;

    if removed != 1 {
        return Err(AppError::OperationFailed("Failed to remove classroom".to_string()));
    }

    tx.commit().await?;

    tracing::info!(
        "Classroom {} removed ({} quizzes, {} members, {} responses)",
        classroom_id,
        quizzes,
        members,
        responses
    );
    Ok(RemovedClassroom {
        quizzes,
        members,
        responses,
    })
}

pub async fn list_teaching(pool: &SqlitePool, teacher: &Principal) -> Result<Vec<Classroom>, AppError> {
    Ok(db::classrooms::list_by_owner(pool, &teacher.external_id).await?)
}

pub async fn list_enrolled(pool: &SqlitePool, principal: &Principal) -> Result<Vec<Classroom>, AppError> {
    Ok(db::classrooms::list_by_student(pool, &principal.email).await?)
}

pub async fn list_students(
    pool: &SqlitePool,
    principal: &Principal,
    classroom_id: i64,
) -> Result<Vec<User>, AppError> {
    let mut conn = pool.acquire().await?;
    require_viewer(&mut conn, classroom_id, principal).await?;
    Ok(db::users::list_by_classroom(&mut *conn, classroom_id).await?)
}

/// Enrolls a batch of emails, creating pending placeholders for unknown ones,
/// then fans out responses for the classroom's existing quizzes.
///
/// The batch is all-or-nothing: an email owned by a teacher account rolls it back.
pub async fn add_students(
    pool: &SqlitePool,
    owner: &Principal,
    classroom_id: i64,
    emails: &[String],
) -> Result<AddStudentsResponse, AppError> {
    let emails: BTreeSet<String> = emails.iter().map(|e| normalize_email(e)).collect();

    let mut tx = db::begin_write(pool).await?;
    require_owner(&mut tx, classroom_id, owner).await?;

    let mut added = 0;
    for email in &emails {
        match db::users::find_by_email(&mut *tx, email).await? {
            None => {
                db::users::insert_pending_student(&mut *tx, email).await?;
            }
            Some(user) if user.position == Position::Teacher => {
                return Err(AppError::Conflict(format!(
                    "{} is registered as a teacher",
                    email
                )));
            }
            Some(_) => {}
        }

        if db::members::insert(&mut *tx, classroom_id, email).await? {
            added += 1;
        }
    }

    let responses_created = ensure_responses(&mut *tx, classroom_id).await?;
    tx.commit().await?;

    tracing::info!(
        "Enrolled {} students in classroom {} ({} responses created)",
        added,
        classroom_id,
        responses_created
    );
    Ok(AddStudentsResponse {
        added,
        responses_created,
    })
}

/// Unenrolls a student and deletes their responses for this classroom's quizzes.
/// Returns the number of responses removed.
pub async fn remove_student(
    pool: &SqlitePool,
    owner: &Principal,
    classroom_id: i64,
    email: &str,
) -> Result<u64, AppError> {
    let email = normalize_email(email);
    let mut tx = db::begin_write(pool).await?;
    require_owner(&mut tx, classroom_id, owner).await?;

    if db::members::delete(&mut *tx, classroom_id, &email).await? == 0 {
        return Err(AppError::OperationFailed("Failed to remove student".to_string()));
    }
    let responses = db::responses::delete_for_student_in_classroom(&mut *tx, classroom_id, &email).await?;

    tx.commit().await?;
    tracing::info!("Removed {} from classroom {}", email, classroom_id);
    Ok(responses)
}
