//! Service layer for the task manager.
//!
//! This crate contains:
//! - Task producers that validate and queue writes, plus inline task CRUD
//! - User management and authentication (Argon2id, JWT, refresh rotation)
//! - Real-time change notifications
//! - Startup wiring for all of the above

pub mod auth;
mod config;
mod error;
mod init;
mod jobs;
mod realtime;
mod scope;
mod tasks;
mod users;

pub use config::{AppConfig, ConfigError};
pub use error::{AuthError, InitError, ServiceError};
pub use init::{TASK_QUEUE_NAME, TaskManager, init_task_manager};
pub use jobs::PersistTaskJob;
pub use realtime::{EVENT_CAPACITY, Notifier, format_sse_event};
pub use scope::{DbScopeProvider, TaskScope};
pub use tasks::{Submission, TaskQueue, TaskService};
pub use users::{NewUser, ProfileUpdate, UserService};
