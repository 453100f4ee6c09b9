use chrono::{Duration, Utc};
use task_core::{Task, User, UserId};

use db::{Database, DbConfig, DbError};

/// A fresh in-memory database with the schema applied.
pub async fn setup_db() -> Result<Database, DbError> {
    let db = db::connect(&DbConfig::memory()).await?;
    db::init_schema(&db).await?;
    Ok(db)
}

pub fn sample_user(username: &str) -> User {
    User::new(username, format!("{username}@example.com"), "not-a-real-hash")
}

pub fn sample_task(description: &str, owner_id: UserId) -> Task {
    Task::new(description, Utc::now() + Duration::days(1), owner_id)
}
