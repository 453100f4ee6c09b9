//! User repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use task_core::{Role, User, UserId};

use crate::record::Record;
use crate::{Database, DbError};

const TABLE: &str = "user";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRow {
    username: String,
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    password_hash: String,
    #[serde(default)]
    is_verified: bool,
    #[serde(default)]
    roles: Vec<Role>,
    created_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            password_hash: user.password_hash.clone(),
            is_verified: user.is_verified,
            roles: user.roles.clone(),
            created_at: user.created_at,
        }
    }
}

impl Record<UserRow> {
    fn into_user(self) -> Result<User, DbError> {
        let id = UserId(self.ulid()?);
        let row = self.data;
        Ok(User {
            id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            password_hash: row.password_hash,
            is_verified: row.is_verified,
            roles: row.roles,
            created_at: row.created_at,
        })
    }
}

/// Repository for user accounts.
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a user. Usernames are unique.
    pub async fn create(&self, user: &User) -> Result<User, DbError> {
        if self.get_by_username(&user.username).await?.is_some() {
            return Err(DbError::Conflict(format!("Username already taken: {}", user.username)));
        }

        let record: Option<Record<UserRow>> = self
            .db
            .create((TABLE, user.id.to_string()))
            .content(UserRow::from(user))
            .await?;

        record
            .ok_or_else(|| DbError::Query("Failed to create user".into()))?
            .into_user()
    }

    pub async fn get(&self, id: UserId) -> Result<User, DbError> {
        let record: Option<Record<UserRow>> = self.db.select((TABLE, id.to_string())).await?;

        record
            .ok_or_else(|| DbError::NotFound(format!("User not found: {}", id)))?
            .into_user()
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let mut response = self
            .db
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let record: Option<Record<UserRow>> = response.take(0)?;

        record.map(|record| record.into_user()).transpose()
    }

    pub async fn exists(&self, id: UserId) -> Result<bool, DbError> {
        let record: Option<Record<UserRow>> = self.db.select((TABLE, id.to_string())).await?;
        Ok(record.is_some())
    }

    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let mut response = self
            .db
            .query("SELECT * FROM user ORDER BY created_at ASC")
            .await?;
        let records: Vec<Record<UserRow>> = response.take(0)?;

        records.into_iter().map(|record| record.into_user()).collect()
    }

    pub async fn update(&self, user: &User) -> Result<User, DbError> {
        let record: Option<Record<UserRow>> = self
            .db
            .update((TABLE, user.id.to_string()))
            .content(UserRow::from(user))
            .await?;

        record
            .ok_or_else(|| DbError::NotFound(format!("User not found: {}", user.id)))?
            .into_user()
    }

    pub async fn delete(&self, id: UserId) -> Result<User, DbError> {
        let record: Option<Record<UserRow>> = self.db.delete((TABLE, id.to_string())).await?;

        record
            .ok_or_else(|| DbError::NotFound(format!("User not found: {}", id)))?
            .into_user()
    }
}
