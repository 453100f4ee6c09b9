//! Real-time task change notifications.

use task_core::TaskEvent;
use tokio::sync::broadcast;

/// Default number of events a slow subscriber may fall behind by.
pub const EVENT_CAPACITY: usize = 1024;

/// Broadcasts task events to every current subscriber.
///
/// Cloning a notifier shares the channel. Publishing with no subscribers is
/// not an error; the event is simply dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<TaskEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_capacity(EVENT_CAPACITY)
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Send an event, returning how many subscribers received it.
    pub fn publish(&self, event: TaskEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!("No subscribers for event: {}", event.description());
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Format an event as a Server-Sent Events frame.
pub fn format_sse_event(event: &TaskEvent) -> String {
    let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    format!("event: {}\ndata: {}\n\n", event.kind(), json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use task_core::{Task, UserId};

    fn task() -> Task {
        Task::new("Ship it", Utc::now() + Duration::days(1), UserId::new())
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let notifier = Notifier::new();
        assert_eq!(notifier.publish(TaskEvent::created(task())), 0);
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_event() -> Result<(), broadcast::error::RecvError> {
        let notifier = Notifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.clone().subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        let task = task();
        assert_eq!(notifier.publish(TaskEvent::updated(task.clone())), 2);

        assert_eq!(first.recv().await?.task_id(), task.id);
        assert_eq!(second.recv().await?.task_id(), task.id);
        Ok(())
    }

    #[test]
    fn sse_frame_names_the_event() {
        let frame = format_sse_event(&TaskEvent::deleted(&task()));
        assert!(frame.starts_with("event: task_deleted\ndata: {"));
        assert!(frame.ends_with("\n\n"));
    }
}
