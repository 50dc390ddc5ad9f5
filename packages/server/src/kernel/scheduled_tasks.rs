//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! # Architecture
//!
//! The expiry sweep runs on a fixed cron schedule, independent of the
//! change-feed listener. It holds no state between runs; a failed run is
//! logged and the next tick re-queries.
//!
//! ```text
//! Scheduler (every hour)
//!     │
//!     └─► sweep_expired_rooms(now)
//!             ├─► find_expired (waiting / pendingJoin, expires_at < now)
//!             └─► delete_batch (one statement)
//! ```

use anyhow::Result;
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::rooms::{sweep_expired_rooms, SweepError, SweepResult};
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps, sweep_schedule: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_job = Job::new_async(sweep_schedule, move |_uuid, _lock| {
        let deps = deps.clone();
        Box::pin(async move {
            if let Err(e) = run_expiry_sweep(&deps).await {
                tracing::error!("Expired room cleanup failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %sweep_schedule, "Scheduled tasks started (expired room cleanup)");
    Ok(scheduler)
}

/// Run one expiry sweep against the configured store
pub async fn run_expiry_sweep(deps: &ServerDeps) -> Result<SweepResult, SweepError> {
    tracing::info!("Running expired room cleanup");

    sweep_expired_rooms(Utc::now(), deps.room_store.as_ref(), deps.sweep_consistency).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::rooms::RoomStatus;
    use crate::kernel::test_dependencies::{InMemoryRoomStore, TestDependencies};
    use chrono::Duration;

    #[tokio::test]
    async fn run_expiry_sweep_uses_wall_clock_now() {
        let now = Utc::now();
        let store = InMemoryRoomStore::new()
            .with_room("stale", RoomStatus::Waiting, now - Duration::days(1))
            .with_room("fresh", RoomStatus::Waiting, now + Duration::days(1));
        let test_deps = TestDependencies::new().mock_store(store);

        let result = run_expiry_sweep(&test_deps.server_deps()).await.unwrap();

        assert_eq!(result.deleted_count, 1);
        assert_eq!(test_deps.room_store.room_ids().len(), 1);
    }

    #[tokio::test]
    async fn invalid_cron_expression_is_rejected() {
        let deps = TestDependencies::new().server_deps();

        assert!(start_scheduler(deps, "every hour").await.is_err());
    }
}
