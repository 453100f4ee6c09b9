//! Core domain types for the task manager.
//!
//! This crate contains shared types used across all packages:
//! - Task, TaskStatus and the task factory
//! - User, Role and RefreshToken for authentication
//! - TaskEvent for real-time change notifications
//! - Validation and completion statistics

mod events;
pub mod factory;
mod stats;
mod task;
mod user;
mod validation;

pub use events::TaskEvent;
pub use stats::CompletionCache;
pub use task::{Task, TaskId, TaskStatus, UnknownStatus};
pub use user::{RefreshToken, Role, User, UserId};
pub use validation::{ValidationError, validate_task};
