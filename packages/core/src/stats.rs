//! Completion statistics over a set of tasks.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::Task;

/// Memoized completion-rate calculator.
///
/// Results are keyed by `(total, completed)`, so any two task lists with the
/// same counts share one cached percentage.
#[derive(Debug, Default)]
pub struct CompletionCache {
    rates: Mutex<HashMap<(usize, usize), f64>>,
}

impl CompletionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage (0-100) of tasks whose status is completed. Empty input is 0.
    pub fn completion_rate(&self, tasks: &[Task]) -> f64 {
        let total = tasks.len();
        if total == 0 {
            return 0.0;
        }
        let completed = tasks.iter().filter(|t| t.is_completed()).count();

        let mut rates = self.rates.lock().unwrap_or_else(PoisonError::into_inner);
        *rates
            .entry((total, completed))
            .or_insert_with(|| completed as f64 / total as f64 * 100.0)
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.rates.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoized rate.
    pub fn clear(&self) {
        self.rates.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaskStatus, UserId};
    use chrono::{Duration, Utc};

    fn tasks(completed: usize, pending: usize) -> Vec<Task> {
        let due = Utc::now() + Duration::days(1);
        let owner = UserId::new();
        (0..completed)
            .map(|i| Task::new(format!("done {i}"), due, owner).with_status(TaskStatus::Completed))
            .chain((0..pending).map(|i| Task::new(format!("todo {i}"), due, owner)))
            .collect()
    }

    #[test]
    fn empty_list_is_zero() {
        let cache = CompletionCache::new();
        assert_eq!(cache.completion_rate(&[]), 0.0);
        assert!(cache.is_empty());
    }

    #[test]
    fn computes_percentage_and_memoizes() {
        let cache = CompletionCache::new();
        assert_eq!(cache.completion_rate(&tasks(1, 3)), 25.0);
        assert_eq!(cache.completion_rate(&tasks(1, 3)), 25.0);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.completion_rate(&tasks(2, 0)), 100.0);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
