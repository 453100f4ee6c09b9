//! Login, registration and refresh-token rotation.

use chrono::Utc;
use db::DbError;
use db::repositories::{RefreshTokenRepository, UserRepository};
use serde::{Deserialize, Serialize};
use task_core::{RefreshToken, Role, User, UserId};

use super::jwt::{self, Claims, JwtConfig};
use super::password::{hash_password, verify_password};
use crate::error::AuthError;

/// Tokens and identity returned after a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub access_token: String,
    /// Plaintext refresh token. Only its hash is stored.
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: RefreshTokenRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(users: UserRepository, tokens: RefreshTokenRepository, jwt: JwtConfig) -> Self {
        Self { users, tokens, jwt }
    }

    /// Check credentials and open a session.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(user) = self.users.get_by_username(username).await? else {
            tracing::warn!("Login failed for unknown user {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!("Login failed for user {}: wrong password", username);
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(&user).await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// The presented token is consumed whether or not it is still valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let hash = jwt::hash_refresh_token(refresh_token);
        // Only the caller whose delete removed the token may use it.
        let Some(stored) = self.tokens.take_by_hash(&hash).await? else {
            return Err(AuthError::Unauthorized);
        };

        if stored.is_expired(Utc::now()) {
            tracing::warn!("Expired refresh token presented for user {}", stored.user_id);
            return Err(AuthError::Unauthorized);
        }

        let user = match self.users.get(stored.user_id).await {
            Ok(user) => user,
            Err(DbError::NotFound(_)) => return Err(AuthError::Unauthorized),
            Err(e) => return Err(e.into()),
        };

        self.issue_session(&user).await
    }

    /// Create an account and log straight into it.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<AuthSession, AuthError> {
        if self.users.get_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let user = User::new(username, email, hash_password(password)?);
        match self.users.create(&user).await {
            Ok(created) => tracing::info!("Registered user {} ({})", created.username, created.id),
            Err(DbError::Conflict(_)) => return Err(AuthError::UsernameTaken(username.to_string())),
            Err(e) => return Err(e.into()),
        }

        self.authenticate(username, password).await
    }

    /// Revoke a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.tokens
            .delete_by_hash(&jwt::hash_refresh_token(refresh_token))
            .await?;
        Ok(())
    }

    /// Validate an access token.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        jwt::validate_token(token, &self.jwt).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            AuthError::Unauthorized
        })
    }

    async fn issue_session(&self, user: &User) -> Result<AuthSession, AuthError> {
        let access_token = jwt::generate_access_token(user, &self.jwt)?;
        let (refresh_token, hash) = jwt::generate_refresh_token();

        let expires_at = self
            .jwt
            .refresh_expires_at(Utc::now())
            .ok_or(AuthError::ExpiryOutOfRange)?;
        self.tokens
            .create(&RefreshToken::new(hash, user.id, expires_at))
            .await?;

        Ok(AuthSession {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            access_token,
            refresh_token,
        })
    }
}
