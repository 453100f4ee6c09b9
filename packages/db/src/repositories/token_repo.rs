//! Refresh token repository. Tokens are keyed by their SHA-256 hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use task_core::{RefreshToken, UserId};

use crate::record::Record;
use crate::{Database, DbError};

const TABLE: &str = "refresh_token";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenRow {
    token_hash: String,
    user_id: UserId,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<&RefreshToken> for TokenRow {
    fn from(token: &RefreshToken) -> Self {
        Self {
            token_hash: token.token_hash.clone(),
            user_id: token.user_id,
            expires_at: token.expires_at,
            created_at: token.created_at,
        }
    }
}

impl Record<TokenRow> {
    fn into_token(self) -> RefreshToken {
        let row = self.data;
        RefreshToken {
            token_hash: row.token_hash,
            user_id: row.user_id,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Repository for issued refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenRepository {
    db: Database,
}

impl RefreshTokenRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, token: &RefreshToken) -> Result<RefreshToken, DbError> {
        let record: Option<Record<TokenRow>> = self
            .db
            .create((TABLE, token.token_hash.clone()))
            .content(TokenRow::from(token))
            .await?;

        record
            .map(|record| record.into_token())
            .ok_or_else(|| DbError::Query("Failed to store refresh token".into()))
    }

    pub async fn get_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DbError> {
        let record: Option<Record<TokenRow>> = self.db.select((TABLE, token_hash.to_string())).await?;
        Ok(record.map(|record| record.into_token()))
    }

    /// Remove one token and return it. Of several concurrent callers, at most
    /// one gets the token back.
    pub async fn take_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DbError> {
        let record: Option<Record<TokenRow>> = self.db.delete((TABLE, token_hash.to_string())).await?;
        Ok(record.map(|record| record.into_token()))
    }

    /// Remove one token. Returns whether it existed.
    pub async fn delete_by_hash(&self, token_hash: &str) -> Result<bool, DbError> {
        Ok(self.take_by_hash(token_hash).await?.is_some())
    }

    /// Revoke every token issued to a user. Returns how many were removed.
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<usize, DbError> {
        let mut response = self
            .db
            .query("DELETE refresh_token WHERE user_id = $user_id RETURN BEFORE")
            .bind(("user_id", user_id.to_string()))
            .await?;
        let removed: Vec<Record<TokenRow>> = response.take(0)?;

        tracing::debug!("Revoked {} refresh tokens for user {}", removed.len(), user_id);
        Ok(removed.len())
    }
}
