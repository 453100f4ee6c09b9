//! User account management.

use db::repositories::{RefreshTokenRepository, UserRepository};
use serde::{Deserialize, Serialize};
use task_core::{Role, User, UserId};

use crate::auth::password::hash_password;
use crate::error::ServiceError;

/// Input for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }
}

/// Profile fields a user may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    tokens: RefreshTokenRepository,
}

impl UserService {
    pub fn new(users: UserRepository, tokens: RefreshTokenRepository) -> Self {
        Self { users, tokens }
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ServiceError> {
        Ok(self.users.get(id).await?)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users.list().await?)
    }

    /// Create an account, storing only the password hash.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        let hash = hash_password(&new_user.password).map_err(|e| ServiceError::Password(e.to_string()))?;

        let mut user = User::new(new_user.username, new_user.email, hash);
        if !new_user.roles.is_empty() {
            user = user.with_roles(new_user.roles);
        }

        let created = self.users.create(&user).await?;
        tracing::info!("User created: {} ({})", created.username, created.id);
        Ok(created)
    }

    /// Apply profile changes. Username, password and roles are not editable here.
    pub async fn update_user(&self, id: UserId, update: ProfileUpdate) -> Result<User, ServiceError> {
        let mut user = self.users.get(id).await?;

        if let Some(email) = update.email {
            user.email = email;
        }
        if update.first_name.is_some() {
            user.first_name = update.first_name;
        }
        if update.last_name.is_some() {
            user.last_name = update.last_name;
        }
        if update.phone_number.is_some() {
            user.phone_number = update.phone_number;
        }

        Ok(self.users.update(&user).await?)
    }

    /// Delete a user and revoke their refresh tokens.
    pub async fn delete_user(&self, id: UserId) -> Result<User, ServiceError> {
        let removed = self.users.delete(id).await?;
        let revoked = self.tokens.delete_for_user(id).await?;
        tracing::info!("User {} deleted, {} refresh tokens revoked", removed.id, revoked);
        Ok(removed)
    }
}
