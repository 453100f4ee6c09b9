//! Task repository for CRUD operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use task_core::{Task, TaskId, TaskStatus, UserId};

use crate::record::Record;
use crate::{Database, DbError};

const TABLE: &str = "task";

/// Stored form of a task. The id lives in the record id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRow {
    description: String,
    due_date: DateTime<Utc>,
    status: TaskStatus,
    additional_data: String,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            description: task.description.clone(),
            due_date: task.due_date,
            status: task.status,
            additional_data: task.additional_data.clone(),
            owner_id: task.owner_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl Record<TaskRow> {
    fn into_task(self) -> Result<Task, DbError> {
        let id = TaskId(self.ulid()?);
        let row = self.data;
        Ok(Task {
            id,
            description: row.description,
            due_date: row.due_date,
            status: row.status,
            additional_data: row.additional_data,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for task persistence operations.
#[derive(Clone)]
pub struct TaskRepository {
    db: Database,
}

impl TaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new task under its own id.
    pub async fn create(&self, task: &Task) -> Result<Task, DbError> {
        let record: Option<Record<TaskRow>> = self
            .db
            .create((TABLE, task.id.to_string()))
            .content(TaskRow::from(task))
            .await?;

        record
            .ok_or_else(|| DbError::Query("Failed to create task".into()))?
            .into_task()
    }

    pub async fn get(&self, id: TaskId) -> Result<Task, DbError> {
        let record: Option<Record<TaskRow>> = self.db.select((TABLE, id.to_string())).await?;

        record
            .ok_or_else(|| DbError::NotFound(format!("Task not found: {}", id)))?
            .into_task()
    }

    /// All tasks, oldest first.
    pub async fn list(&self) -> Result<Vec<Task>, DbError> {
        let mut response = self
            .db
            .query("SELECT * FROM task ORDER BY created_at ASC")
            .await?;
        let records: Vec<Record<TaskRow>> = response.take(0)?;

        records.into_iter().map(|record| record.into_task()).collect()
    }

    pub async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Task>, DbError> {
        let mut response = self
            .db
            .query("SELECT * FROM task WHERE owner_id = $owner_id ORDER BY created_at ASC")
            .bind(("owner_id", owner_id.to_string()))
            .await?;
        let records: Vec<Record<TaskRow>> = response.take(0)?;

        records.into_iter().map(|record| record.into_task()).collect()
    }

    /// Whether any task already has exactly this description.
    pub async fn description_exists(&self, description: &str) -> Result<bool, DbError> {
        let mut response = self
            .db
            .query("SELECT * FROM task WHERE description = $description LIMIT 1")
            .bind(("description", description.to_string()))
            .await?;
        let record: Option<Record<TaskRow>> = response.take(0)?;

        Ok(record.is_some())
    }

    /// Replace a stored task, stamping `updated_at`.
    pub async fn update(&self, task: &Task) -> Result<Task, DbError> {
        let mut row = TaskRow::from(task);
        row.updated_at = Utc::now();

        let record: Option<Record<TaskRow>> = self
            .db
            .update((TABLE, task.id.to_string()))
            .content(row)
            .await?;

        record
            .ok_or_else(|| DbError::NotFound(format!("Task not found: {}", task.id)))?
            .into_task()
    }

    /// Delete a task, returning what was removed.
    pub async fn delete(&self, id: TaskId) -> Result<Task, DbError> {
        let record: Option<Record<TaskRow>> = self.db.delete((TABLE, id.to_string())).await?;

        record
            .ok_or_else(|| DbError::NotFound(format!("Task not found: {}", id)))?
            .into_task()
    }
}
