//! Wiring for a running task manager.

use db::Database;
use db::repositories::{RefreshTokenRepository, TaskRepository, UserRepository};
use job_queue::JobQueue;

use crate::auth::{AuthService, JwtConfig};
use crate::config::AppConfig;
use crate::error::InitError;
use crate::realtime::Notifier;
use crate::scope::DbScopeProvider;
use crate::tasks::{TaskQueue, TaskService};
use crate::users::UserService;

/// Name of the queue task writes go through.
pub const TASK_QUEUE_NAME: &str = "tasks";

/// A fully wired task manager.
#[derive(Clone)]
pub struct TaskManager {
    pub db: Database,
    pub notifier: Notifier,
    pub queue: TaskQueue,
    pub tasks: TaskService,
    pub users: UserService,
    pub auth: AuthService,
}

/// Initialize the task manager on a fresh connection.
///
/// Must be called inside a tokio runtime; the task queue's drain loop runs on it.
pub async fn init_task_manager(config: AppConfig) -> Result<TaskManager, InitError> {
    tracing::info!("Initializing task manager...");

    let db = db::connect(&config.db).await?;
    db::init_schema(&db).await?;

    TaskManager::with_database(db, config.jwt)
}

impl TaskManager {
    /// Wire the services over an existing connection whose schema is already
    /// in place.
    pub fn with_database(db: Database, jwt: JwtConfig) -> Result<Self, InitError> {
        let notifier = Notifier::new();
        let queue = JobQueue::new(TASK_QUEUE_NAME, DbScopeProvider::new(db.clone(), notifier.clone()))?;

        let tasks = TaskService::new(TaskRepository::new(db.clone()), queue.clone(), notifier.clone());
        let users = UserService::new(
            UserRepository::new(db.clone()),
            RefreshTokenRepository::new(db.clone()),
        );
        let auth = AuthService::new(
            UserRepository::new(db.clone()),
            RefreshTokenRepository::new(db.clone()),
            jwt,
        );

        tracing::info!("Task manager initialized");

        Ok(Self {
            db,
            notifier,
            queue,
            tasks,
            users,
            auth,
        })
    }
}
