use crate::email::Notifier;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Start the dead-letter redelivery job on `cron_expr`
/// (six fields: second minute hour day month day_of_week).
pub async fn start_scheduler(cron_expr: &str, notifier: Arc<Notifier>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    info!("Scheduling notification redelivery (cron: {})", cron_expr);

    let job = Job::new_async(cron_expr, move |_uuid, _l| {
        let notifier = Arc::clone(&notifier);

        Box::pin(async move {
            if let Err(e) = notifier.redeliver_dead_letters().await {
                error!("Notification redelivery failed: {:#}", e);
            }
        })
    })
    .with_context(|| format!("Invalid NOTIFICATION_RETRY_SCHEDULE: {}", cron_expr))?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("✓ Scheduler started");

    Ok(scheduler)
}
