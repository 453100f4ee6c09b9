#![allow(dead_code)]

use api::auth::JwtConfig;
use api::{AppConfig, InitError, TaskManager, init_task_manager};
use db::repositories::UserRepository;
use db::{DbConfig, DbError};
use task_core::User;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub fn test_config() -> AppConfig {
    AppConfig::new(DbConfig::memory(), JwtConfig::new(TEST_SECRET))
}

/// A task manager on its own in-memory database.
pub async fn manager() -> Result<TaskManager, InitError> {
    init_task_manager(test_config()).await
}

/// Insert a user directly, skipping password hashing.
pub async fn seed_user(manager: &TaskManager, username: &str) -> Result<User, DbError> {
    let user = User::new(username, format!("{username}@example.com"), "unused-hash");
    UserRepository::new(manager.db.clone()).create(&user).await
}
