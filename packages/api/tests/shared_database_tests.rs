mod common;

use std::error::Error;

use api::TaskManager;
use api::auth::JwtConfig;
use common::TEST_SECRET;
use db::DbConfig;
use db::repositories::TaskRepository;

#[tokio::test]
async fn manager_runs_on_the_process_wide_database() -> Result<(), Box<dyn Error>> {
    let db = db::init(DbConfig::memory()).await?;
    let m = TaskManager::with_database(db.clone(), JwtConfig::new(TEST_SECRET))?;

    let session = m.auth.register("olga", "olga-password", "olga@example.com").await?;
    assert!(m.tasks.add_high_priority_task("Ship it", session.user_id).is_accepted());
    m.queue.wait_idle().await;

    // The queued write landed in the shared connection.
    let stored = TaskRepository::new(db::get_db()?.clone()).list().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].owner_id, session.user_id);
    Ok(())
}
