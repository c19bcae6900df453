// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried in the OAuth `state` parameter.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StateClaims {
    /// Random value also stored in the session that started the login.
    pub nonce: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs the OAuth `state` value for a login attempt.
///
/// Arguments:
/// * `nonce`: value stored in the caller's session.
/// * `expiration_seconds`: how long the consent round trip may take.
pub fn sign_state(nonce: &str, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = StateClaims {
        nonce: nonce.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a `state` value returned by the provider.
pub fn verify_state(token: &str, secret: &str) -> Result<StateClaims, AppError> {
    let token_data = decode::<StateClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Forbidden("Invalid OAuth state".to_string()))?;

    Ok(token_data.claims)
}
