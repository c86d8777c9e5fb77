//! Cron-style job scheduler using tokio-cron-scheduler.

use std::sync::Arc;

use chrono::TimeDelta;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use pixgram_core::ports::{BlobStore, DocumentStore};
use pixgram_core::services::OrphanSweeper;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

/// When and how aggressively half-uploaded posts are removed.
#[derive(Debug, Clone)]
pub struct OrphanSweepConfig {
    /// Six-field cron expression (seconds first).
    pub schedule: String,
    /// Posts younger than this are still uploading.
    pub grace: TimeDelta,
}

impl Default for OrphanSweepConfig {
    fn default() -> Self {
        Self {
            schedule: "0 */15 * * * *".to_string(),
            grace: TimeDelta::minutes(30),
        }
    }
}

impl OrphanSweepConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            schedule: std::env::var("ORPHAN_SWEEP_SCHEDULE").unwrap_or(defaults.schedule),
            grace: std::env::var("ORPHAN_GRACE_MINUTES")
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .map(TimeDelta::minutes)
                .unwrap_or(defaults.grace),
        }
    }
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Add a cron job.
    ///
    /// # Example
    /// ```ignore
    /// scheduler.add_cron("0 0 * * * *", || async {
    ///     tracing::info!("Running hourly job");
    /// }).await?;
    /// ```
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// Register the periodic removal of posts whose image upload never finished.
pub async fn schedule_orphan_sweep(
    scheduler: &Scheduler,
    config: &OrphanSweepConfig,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
) -> Result<uuid::Uuid, JobSchedulerError> {
    let sweeper = Arc::new(OrphanSweeper::new(store, blobs, config.grace));

    scheduler
        .add_cron(&config.schedule, move || {
            let sweeper = Arc::clone(&sweeper);
            async move {
                match sweeper.sweep(chrono::Utc::now()).await {
                    Ok(0) => tracing::debug!("Orphan sweep found nothing"),
                    Ok(removed) => tracing::info!(removed, "Orphaned posts removed"),
                    Err(e) => tracing::error!(error = %e, "Orphan sweep failed"),
                }
            }
        })
        .await
}
