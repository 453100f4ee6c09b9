//! SurrealDB persistence for the task manager.
//!
//! This crate provides database connectivity and repositories for
//! tasks, users and refresh tokens.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod record;
mod schema;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, connect, get_db, init_db};
pub use schema::init_schema;

/// Initialize the process-wide database and its schema.
///
/// This should be called once at application startup.
pub async fn init(config: DbConfig) -> Result<&'static Database, DbError> {
    let db = init_db(config).await?;
    init_schema(db).await?;
    Ok(db)
}
