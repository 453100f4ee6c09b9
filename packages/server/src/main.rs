//! Task manager service process.
//!
//! Loads configuration from the environment (and a `.env` file, if present),
//! opens the process-wide database, wires the services, relays task
//! events to the log, and drains the task queue on Ctrl-C.

use api::{AppConfig, TaskManager, format_sse_event};
use task_core::TaskEvent;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let db = db::init(config.db).await?;
    let manager = TaskManager::with_database(db.clone(), config.jwt)?;

    let relay = tokio::spawn(relay_events(manager.notifier.subscribe()));

    tracing::info!("Task manager running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    tracing::info!(
        "Shutting down, waiting for {} queued jobs",
        manager.queue.pending_len()
    );
    manager.queue.wait_idle().await;

    let stats = manager.queue.stats();
    tracing::info!(
        "Task queue drained: {} succeeded, {} failed",
        stats.succeeded,
        stats.failed
    );
    relay.abort();
    Ok(())
}

async fn relay_events(mut events: Receiver<TaskEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                tracing::info!("{}", event.description());
                tracing::debug!("{}", format_sse_event(&event).trim_end());
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Event relay lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
