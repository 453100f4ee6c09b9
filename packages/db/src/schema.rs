//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// Tables are schemaless; the indexes enforce uniqueness and speed up the
/// lookups the repositories make. Safe to run more than once.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    db.query(TASK_SCHEMA).await?.check()?;
    db.query(USER_SCHEMA).await?.check()?;
    db.query(REFRESH_TOKEN_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

const TASK_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS task SCHEMALESS;

DEFINE INDEX IF NOT EXISTS task_owner ON task FIELDS owner_id;
DEFINE INDEX IF NOT EXISTS task_description ON task FIELDS description;
"#;

const USER_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;

DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE;
"#;

const REFRESH_TOKEN_SCHEMA: &str = r#"
-- Only SHA-256 hashes of refresh tokens are ever stored
DEFINE TABLE IF NOT EXISTS refresh_token SCHEMALESS;

DEFINE INDEX IF NOT EXISTS refresh_token_hash ON refresh_token FIELDS token_hash UNIQUE;
DEFINE INDEX IF NOT EXISTS refresh_token_user ON refresh_token FIELDS user_id;
"#;
