use std::sync::Arc;

use cvsync::SyncOutcome;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::commands::shared::{Engine, build_engine};
use crate::config::Config;
use crate::shutdown;

/// Run once now, then on every cron tick until Ctrl+C.
pub(crate) async fn handle_daemon(
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(build_engine(config, database_url, false).await?);
    let running = Arc::new(Mutex::new(()));
    let cron = config.schedule.cron.clone();

    let mut scheduler = JobScheduler::new()
        .await
        .map_err(|e| format!("Failed to create scheduler: {e}"))?;

    let job_engine = Arc::clone(&engine);
    let job_running = Arc::clone(&running);
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let engine = Arc::clone(&job_engine);
        let running = Arc::clone(&job_running);
        Box::pin(async move {
            run_guarded(&engine, &running, "schedule").await;
        })
    })
    .map_err(|e| format!("Invalid schedule.cron '{cron}': {e}"))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| format!("Failed to schedule sync: {e}"))?;

    run_guarded(&engine, &running, "startup").await;

    scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {e}"))?;
    info!(cron = %cron, environment = config.environment(), "Scheduler started");

    shutdown::wait_for_shutdown().await;

    scheduler
        .shutdown()
        .await
        .map_err(|e| format!("Failed to stop scheduler: {e}"))?;
    // Let an in-flight pass finish before exiting.
    let _idle = running.lock().await;
    info!("Scheduler stopped");

    Ok(())
}

/// Run one pass unless another is still in progress.
async fn run_guarded(engine: &Engine, running: &Mutex<()>, trigger: &str) {
    let Ok(_guard) = running.try_lock() else {
        warn!(trigger, "Previous sync still running, skipping this trigger");
        return;
    };

    match engine.run_full_sync().await {
        Ok(SyncOutcome::Skipped { local_hour }) => {
            info!(trigger, local_hour, "Skipped, outside operating window");
        }
        Ok(SyncOutcome::Completed(summary)) => {
            info!(
                trigger,
                written = summary.total_written(),
                degraded = summary.degraded().count(),
                "Sync finished"
            );
        }
        Err(e) => {
            // The next trigger retries from scratch.
            error!(trigger, error = %e, "Sync failed");
        }
    }
}
