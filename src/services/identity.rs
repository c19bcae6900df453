// src/services/identity.rs

//! Maps an OAuth identity onto a local user row.

use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    models::user::{ExternalProfile, Position, User, normalize_email},
};

/// Resolves the provider profile to a user, given the role stashed in the session.
///
/// * No user with that email: create one with the requested role.
/// * Existing user with the other role: rejected, an email has one role.
/// * Existing pending placeholder: adopt the provider identity onto it.
/// * Otherwise the existing row is returned unchanged.
pub async fn reconcile(
    pool: &SqlitePool,
    profile: &ExternalProfile,
    position: Option<Position>,
) -> Result<User, AppError> {
    let position = position
        .ok_or_else(|| AppError::BadRequest("Position not found in session".to_string()))?;

    let email = profile
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("Need an email".to_string()))?;

    let mut tx = db::begin_write(pool).await?;

    let user = match db::users::find_by_email(&mut *tx, &email).await? {
        None => {
            tracing::info!("Creating {} account for {}", position, email);
            db::users::insert_from_profile(&mut *tx, profile, &email, position)
                .await
                .map_err(|e| linked_elsewhere(e, &email))?
        }
        Some(existing) if existing.position != position => {
            tracing::warn!(
                "Login for {} as {} rejected, account is a {}",
                email,
                position,
                existing.position
            );
            return Err(AppError::Conflict(format!(
                "{} is registered as a {}",
                email, existing.position
            )));
        }
        Some(existing) if existing.is_pending => {
            tracing::info!("Claiming pending account {} for {}", existing.id, email);
            db::users::claim_pending(&mut *tx, existing.id, profile, position)
                .await
                .map_err(|e| linked_elsewhere(e, &email))?
        }
        Some(existing) => existing,
    };

    tx.commit().await?;
    Ok(user)
}

/// The Google id is already attached to a row with a different email.
fn linked_elsewhere(err: sqlx::Error, email: &str) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => AppError::Conflict(format!(
            "This Google account is already linked to an address other than {}",
            email
        )),
        _ => AppError::from(err),
    }
}
