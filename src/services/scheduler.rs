//! Cron-driven sync runs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use super::monitor::SheetMonitor;

pub struct SyncScheduler {
    monitor: Arc<SheetMonitor>,
}

impl SyncScheduler {
    pub fn new(monitor: Arc<SheetMonitor>) -> Self {
        Self { monitor }
    }

    /// Start the cron job and hand back the scheduler so the caller can shut
    /// it down. Overlapping firings queue on the monitor's run lock.
    ///
    /// # Arguments
    /// * `cron_expression` - six fields, seconds first (e.g. "0 */5 * * * *")
    pub async fn start(
        &self,
        cron_expression: &str,
    ) -> Result<JobScheduler, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;
        let monitor = self.monitor.clone();

        let job = Job::new_async(cron_expression, move |_uuid, _l| {
            let monitor = monitor.clone();

            Box::pin(async move {
                let result = monitor.run_once().await;
                if !result.ok {
                    warn!(
                        "⚠️ [SCHEDULER] Scheduled sync failed: {}",
                        result.error.unwrap_or_default()
                    );
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("⏰ [SCHEDULER] Sync job started with schedule: {}", cron_expression);
        Ok(scheduler)
    }
}
