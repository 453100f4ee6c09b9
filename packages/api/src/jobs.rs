//! Queued task writes.

use job_queue::{Job, JobError, JobFuture, JobOutcome};
use task_core::{Task, TaskEvent};

use crate::scope::TaskScope;

/// Persist a validated task, then announce it.
///
/// The job carries the task by value; everything it touches comes from the
/// scope it is handed.
#[derive(Debug, Clone)]
pub struct PersistTaskJob {
    task: Task,
    label: String,
}

impl PersistTaskJob {
    pub fn new(task: Task, label: impl Into<String>) -> Self {
        Self {
            task,
            label: label.into(),
        }
    }

    async fn execute(self, scope: TaskScope) -> JobOutcome {
        let TaskScope {
            tasks,
            users,
            notifier,
        } = scope;
        let task = self.task;

        if !users.exists(task.owner_id).await.map_err(db_failure)? {
            return Err(JobError::failed(format!(
                "owner {} of task {} does not exist",
                task.owner_id, task.id
            )));
        }
        if tasks
            .description_exists(&task.description)
            .await
            .map_err(db_failure)?
        {
            return Err(JobError::failed(format!(
                "a task described as {:?} already exists",
                task.description
            )));
        }

        let created = tasks.create(&task).await.map_err(db_failure)?;
        tracing::info!("[{}] task created: {}", self.label, created.id);
        notifier.publish(TaskEvent::created(created.clone()));

        Ok(format!("task {} created", created.id))
    }
}

fn db_failure(err: db::DbError) -> JobError {
    JobError::failed(err.to_string())
}

impl Job<TaskScope> for PersistTaskJob {
    fn label(&self) -> &str {
        &self.label
    }

    fn run(self: Box<Self>, scope: TaskScope) -> JobFuture {
        Box::pin((*self).execute(scope))
    }
}
