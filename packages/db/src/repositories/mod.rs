//! Repository implementations for database operations.
//!
//! Each repository holds its own [`Database`](crate::Database) handle, so a
//! caller can build a fresh set per unit of work.

mod task_repo;
mod token_repo;
mod user_repo;

pub use task_repo::TaskRepository;
pub use token_repo::RefreshTokenRepository;
pub use user_repo::UserRepository;
