//! JWT access tokens and opaque refresh tokens.
//!
//! Access tokens are HS256-signed JWTs carrying [`Claims`]. Refresh tokens are
//! random strings; only their SHA-256 hash is stored server-side.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use task_core::User;
use uuid::Uuid;

use crate::error::AuthError;

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user's id.
    pub sub: String,
    /// The username.
    pub name: String,
    pub roles: Vec<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
}

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry_mins: 120,
            refresh_token_expiry_days: 7,
        }
    }

    pub fn with_access_expiry_mins(mut self, mins: i64) -> Self {
        self.access_token_expiry_mins = mins;
        self
    }

    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry_days = days;
        self
    }

    /// When an access token issued at `now` expires. `None` if the configured
    /// lifetime does not fit in a timestamp.
    pub fn access_expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        expiry_after(now, TimeDelta::try_minutes(self.access_token_expiry_mins))
    }

    /// When a refresh token issued at `now` expires.
    pub fn refresh_expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        expiry_after(now, TimeDelta::try_days(self.refresh_token_expiry_days))
    }
}

fn expiry_after(now: DateTime<Utc>, lifetime: Option<TimeDelta>) -> Option<DateTime<Utc>> {
    now.checked_add_signed(lifetime?)
}

/// Generate an HS256 access token for `user`.
pub fn generate_access_token(user: &User, config: &JwtConfig) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires_at = config
        .access_expires_at(now)
        .ok_or(AuthError::ExpiryOutOfRange)?;

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.username.clone(),
        roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(token)
}

/// Validate signature and expiry, returning the embedded [`Claims`].
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Generate a random refresh token as `(plaintext, sha256_hex)`.
///
/// The plaintext goes to the client; only the hash is persisted.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
