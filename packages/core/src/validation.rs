//! Structural validation applied to tasks before they are written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Task;

/// Why a task was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("task description must not be empty")]
    EmptyDescription,

    #[error("task due date must be in the future")]
    DueDateNotInFuture,
}

/// Check a task against `now`.
///
/// The description must contain non-whitespace text and the due date must be
/// strictly after `now`.
pub fn validate_task(task: &Task, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if task.description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if task.due_date <= now {
        return Err(ValidationError::DueDateNotInFuture);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;
    use chrono::Duration;

    #[test]
    fn accepts_future_task_with_description() {
        let now = Utc::now();
        let task = Task::new("write report", now + Duration::hours(1), UserId::new());
        assert_eq!(validate_task(&task, now), Ok(()));
    }

    #[test]
    fn rejects_blank_description() {
        let now = Utc::now();
        let task = Task::new("   ", now + Duration::hours(1), UserId::new());
        assert_eq!(validate_task(&task, now), Err(ValidationError::EmptyDescription));
    }

    #[test]
    fn rejects_due_date_equal_to_now() {
        let now = Utc::now();
        let task = Task::new("late", now, UserId::new());
        assert_eq!(validate_task(&task, now), Err(ValidationError::DueDateNotInFuture));
    }
}
