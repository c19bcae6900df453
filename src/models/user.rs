// src/models/user.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role. Fixed per email once the account exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Position {
    Teacher,
    Student,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Teacher => "teacher",
            Position::Student => "student",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Position::Teacher),
            "student" => Ok(Position::Student),
            other => Err(format!("Invalid position '{}'", other)),
        }
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Google account id. `None` while the row is a pending placeholder.
    pub external_id: Option<String>,

    pub name: String,

    /// Unique, lower-cased. Students are looked up by email everywhere.
    pub email: String,

    pub profile_picture: Option<String>,

    pub position: Position,

    /// True for placeholders created by a teacher before the student's first login.
    pub is_pending: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Identity as reported by the OAuth provider after a successful code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalProfile {
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
}

/// Trims and lower-cases an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
