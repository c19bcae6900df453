// src/services/quizzes.rs

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    db::{self, quizzes::NewQuiz},
    error::AppError,
    models::{
        quiz::{CreateQuizRequest, Quiz},
        quiz_response::QuizResponse,
        user::{Position, normalize_email},
    },
    services::classrooms::{ensure_responses, require_owner, require_viewer},
    utils::{auth::Principal, html::clean_html},
};

async fn find_quiz(conn: &mut SqliteConnection, quiz_id: i64) -> Result<Quiz, AppError> {
    db::quizzes::find_by_id(&mut *conn, quiz_id)
        .await?
        .ok_or_else(|| AppError::OperationFailed("Quiz not found".to_string()))
}

/// Loads the quiz and checks the principal owns its classroom.
pub async fn require_quiz_owner(
    conn: &mut SqliteConnection,
    quiz_id: i64,
    principal: &Principal,
) -> Result<Quiz, AppError> {
    let quiz = find_quiz(conn, quiz_id).await?;
    require_owner(conn, quiz.classroom_id, principal).await?;
    Ok(quiz)
}

/// Creates an open quiz and assigns it to every current member.
pub async fn add_quiz(
    pool: &SqlitePool,
    owner: &Principal,
    classroom_id: i64,
    req: &CreateQuizRequest,
) -> Result<Quiz, AppError> {
    // Names are plain text, the question is rendered as HTML.
    let name = req.name.trim();
    let question = clean_html(&req.question);

    let mut tx = db::begin_write(pool).await?;
    require_owner(&mut tx, classroom_id, owner).await?;

    let quiz = db::quizzes::insert(
        &mut *tx,
        &NewQuiz {
            classroom_id,
            name,
            question: &question,
            quiz_type: req.quiz_type,
            max_points: req.max_points,
            close_at: req.close_at,
        },
    )
    .await?;
    let assigned = ensure_responses(&mut *tx, classroom_id).await?;

    tx.commit().await?;
    tracing::info!("Quiz {} added to classroom {}, assigned to {} students", quiz.id, classroom_id, assigned);
    Ok(quiz)
}

/// Deletes a quiz together with all of its responses.
pub async fn remove_quiz(pool: &SqlitePool, owner: &Principal, quiz_id: i64) -> Result<u64, AppError> {
    let mut tx = db::begin_write(pool).await?;
    require_quiz_owner(&mut tx, quiz_id, owner).await?;

    let responses = db::responses::delete_by_quiz(&mut *tx, quiz_id).await?;
    if db::quizzes::delete(&mut *tx, quiz_id).await? != 1 {
        return Err(AppError::OperationFailed("Failed to remove quiz".to_string()));
    }

    tx.commit().await?;
    tracing::info!("Quiz {} removed with {} responses", quiz_id, responses);
    Ok(responses)
}

/// Teacher action: closes the quiz whatever its deadline says.
pub async fn close_quiz(pool: &SqlitePool, owner: &Principal, quiz_id: i64) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;
    require_quiz_owner(&mut conn, quiz_id, owner).await?;

    if db::quizzes::close(&mut *conn, quiz_id).await? != 1 {
        return Err(AppError::OperationFailed("Failed to close quiz".to_string()));
    }
    Ok(())
}

pub async fn get_quiz(pool: &SqlitePool, principal: &Principal, quiz_id: i64) -> Result<Quiz, AppError> {
    let mut conn = pool.acquire().await?;
    let quiz = find_quiz(&mut conn, quiz_id).await?;
    require_viewer(&mut conn, quiz.classroom_id, principal).await?;
    Ok(quiz)
}

pub async fn list_by_classroom(
    pool: &SqlitePool,
    principal: &Principal,
    classroom_id: i64,
) -> Result<Vec<Quiz>, AppError> {
    let mut conn = pool.acquire().await?;
    require_viewer(&mut conn, classroom_id, principal).await?;
    Ok(db::quizzes::list_by_classroom(&mut *conn, classroom_id).await?)
}

/// Quizzes of the classroom that are assigned to the caller.
pub async fn list_assigned(
    pool: &SqlitePool,
    principal: &Principal,
    classroom_id: i64,
) -> Result<Vec<Quiz>, AppError> {
    Ok(db::quizzes::list_assigned(pool, classroom_id, &principal.email).await?)
}

pub async fn submit_answer(
    pool: &SqlitePool,
    student: &Principal,
    quiz_id: i64,
    answer: &str,
) -> Result<(), AppError> {
    let affected = db::responses::submit_answer(pool, quiz_id, &student.email, answer).await?;
    if affected != 1 {
        return Err(AppError::OperationFailed("Failed to submit quiz".to_string()));
    }
    Ok(())
}

pub async fn unsubmit_answer(pool: &SqlitePool, student: &Principal, quiz_id: i64) -> Result<(), AppError> {
    let affected = db::responses::unsubmit_answer(pool, quiz_id, &student.email).await?;
    if affected != 1 {
        return Err(AppError::OperationFailed("Failed to unsubmit quiz".to_string()));
    }
    Ok(())
}

pub async fn submit_grade(
    pool: &SqlitePool,
    owner: &Principal,
    quiz_id: i64,
    student_email: &str,
    comment: &str,
    points: i64,
) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;
    require_quiz_owner(&mut conn, quiz_id, owner).await?;

    let affected = db::responses::submit_grade(
        &mut *conn,
        quiz_id,
        &normalize_email(student_email),
        &clean_html(comment),
        points,
    )
    .await?;
    if affected != 1 {
        return Err(AppError::OperationFailed("Failed to grade quiz".to_string()));
    }
    Ok(())
}

pub async fn unsubmit_grade(
    pool: &SqlitePool,
    owner: &Principal,
    quiz_id: i64,
    student_email: &str,
) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;
    require_quiz_owner(&mut conn, quiz_id, owner).await?;

    let affected = db::responses::unsubmit_grade(&mut *conn, quiz_id, &normalize_email(student_email)).await?;
    if affected != 1 {
        return Err(AppError::OperationFailed("Failed to ungrade quiz".to_string()));
    }
    Ok(())
}

/// One response. Students always get their own; teachers must name a student
/// of a quiz they own.
pub async fn get_response(
    pool: &SqlitePool,
    principal: &Principal,
    quiz_id: i64,
    student: Option<&str>,
) -> Result<Option<QuizResponse>, AppError> {
    let mut conn = pool.acquire().await?;
    let email = match principal.position {
        Position::Student => principal.email.clone(),
        Position::Teacher => {
            require_quiz_owner(&mut conn, quiz_id, principal).await?;
            student
                .map(normalize_email)
                .ok_or_else(|| AppError::BadRequest("A student email is required".to_string()))?
        }
    };
    Ok(db::responses::find(&mut *conn, quiz_id, &email).await?)
}

/// Responses of one quiz for the given students, in the order asked.
/// Students without a response come back as `None`.
pub async fn responses_for_students(
    pool: &SqlitePool,
    owner: &Principal,
    quiz_id: i64,
    emails: &[String],
) -> Result<Vec<Option<QuizResponse>>, AppError> {
    let mut conn = pool.acquire().await?;
    require_quiz_owner(&mut conn, quiz_id, owner).await?;

    let by_email: HashMap<String, QuizResponse> = db::responses::list_by_quiz(&mut *conn, quiz_id)
        .await?
        .into_iter()
        .map(|r| (r.student_email.clone(), r))
        .collect();

    Ok(emails
        .iter()
        .map(|e| by_email.get(&normalize_email(e)).cloned())
        .collect())
}

/// The caller's responses for the given quizzes, in the order asked.
pub async fn responses_for_quizzes(
    pool: &SqlitePool,
    principal: &Principal,
    quiz_ids: &[i64],
) -> Result<Vec<Option<QuizResponse>>, AppError> {
    let by_quiz: HashMap<i64, QuizResponse> = db::responses::list_by_student(pool, &principal.email)
        .await?
        .into_iter()
        .map(|r| (r.quiz_id, r))
        .collect();

    Ok(quiz_ids.iter().map(|id| by_quiz.get(id).cloned()).collect())
}
