// src/models/classroom.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidateEmail, ValidationError};

/// Represents the 'classrooms' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Classroom {
    pub id: i64,
    pub name: String,

    /// External (Google) id of the owning teacher.
    pub owner_external_id: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a classroom.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassroomRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Classroom name length must be between 1 and 100 characters."
    ))]
    pub name: String,
}

/// DTO for enrolling students in bulk.
#[derive(Debug, Deserialize, Validate)]
pub struct AddStudentsRequest {
    #[validate(custom(function = validate_student_emails))]
    pub students: Vec<String>,
}

/// Outcome of a bulk enrollment.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AddStudentsResponse {
    /// New memberships created (already-enrolled emails are not counted).
    pub added: u64,
    /// Quiz responses created by the fan-out.
    pub responses_created: u64,
}

fn validate_student_emails(emails: &[String]) -> Result<(), ValidationError> {
    if emails.is_empty() {
        return Err(ValidationError::new("students_cannot_be_empty"));
    }
    if emails.len() > 500 {
        return Err(ValidationError::new("too_many_students"));
    }
    for email in emails {
        let trimmed = email.trim().to_string();
        if !trimmed.validate_email() {
            let mut err = ValidationError::new("invalid_email");
            err.message = Some(format!("'{}' is not a valid email", email).into());
            return Err(err);
        }
    }
    Ok(())
}
