// src/utils/oauth.rs

//! Google OAuth 2.0 authorization-code flow.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{config::Config, error::AppError, models::user::ExternalProfile};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// An external identity provider that can authenticate a browser.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to, carrying the signed `state`.
    fn authorize_url(&self, state: &str) -> Result<String, AppError>;

    /// Trades the callback `code` for the user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AppError>;
}

pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    email_verified: Option<bool>,
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.oauth_redirect_url.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("prompt", "select_account"),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AppError> {
        let token = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!("Google token exchange failed: {:?}", e);
                AppError::Forbidden("OAuth code exchange failed".to_string())
            })?
            .json::<TokenResponse>()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let info = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::InternalServerError(format!("Google userinfo failed: {}", e)))?
            .json::<UserInfo>()
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(profile_from_userinfo(info))
    }
}

/// Unverified emails are dropped so they cannot claim a pending account.
fn profile_from_userinfo(info: UserInfo) -> ExternalProfile {
    let email = match info.email_verified {
        Some(false) => None,
        _ => info.email,
    };
    let name = info
        .name
        .or_else(|| email.clone())
        .unwrap_or_else(|| info.sub.clone());

    ExternalProfile {
        external_id: info.sub,
        name,
        email,
        picture: info.picture,
    }
}
