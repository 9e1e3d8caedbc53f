//! Calendar-mirror reconciliation trigger.
//!
//! Confirmed bookings can miss their side effects when a push fails past
//! its retry budget or the process dies mid-dispatch. This cron pass
//! re-runs `on_booking_confirmed` for such bookings; the dispatcher's
//! idempotency keys make the re-run safe.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use slotwise_core::booking::ports::BookingStore;
use slotwise_core::SideEffectDispatcher;
use slotwise_domain::constants::DEFAULT_MIRROR_CRON;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the mirror reconciliation scheduler.
#[derive(Debug, Clone)]
pub struct MirrorSchedulerConfig {
    /// Cron expression describing the reconciliation schedule.
    pub cron_expression: String,
    /// Maximum bookings reconciled per pass.
    pub batch_size: usize,
    /// Timeout applied to a single pass.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
}

impl Default for MirrorSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_MIRROR_CRON.into(),
            batch_size: 25,
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

/// Mirror reconciliation trigger with explicit lifecycle management.
pub struct MirrorScheduler {
    scheduler: Option<JobScheduler>,
    config: MirrorSchedulerConfig,
    store: Arc<dyn BookingStore>,
    dispatcher: Arc<SideEffectDispatcher>,
}

impl MirrorScheduler {
    /// Create a scheduler with the default configuration.
    pub fn new(store: Arc<dyn BookingStore>, dispatcher: Arc<SideEffectDispatcher>) -> Self {
        Self::with_config(MirrorSchedulerConfig::default(), store, dispatcher)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(
        config: MirrorSchedulerConfig,
        store: Arc<dyn BookingStore>,
        dispatcher: Arc<SideEffectDispatcher>,
    ) -> Self {
        Self { scheduler: None, config, store, dispatcher }
    }

    /// Start the scheduler.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?
            .map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        self.scheduler = Some(scheduler_instance);
        info!(cron = %self.config.cron_expression, "mirror scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let mut scheduler = self.scheduler.take().ok_or(SchedulerError::NotRunning)?;

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, scheduler.shutdown())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
            .map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        info!("mirror scheduler stopped");
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;

        let store = self.store.clone();
        let dispatcher = self.dispatcher.clone();
        let batch_size = self.config.batch_size;
        let job_timeout = self.config.job_timeout;

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let store = store.clone();
            let dispatcher = dispatcher.clone();

            Box::pin(async move {
                let pass = Self::reconcile(store, dispatcher, batch_size);
                match tokio::time::timeout(job_timeout, pass).await {
                    Ok(Ok(reconciled)) => {
                        if reconciled > 0 {
                            debug!(reconciled, "mirror reconciliation completed");
                        }
                    }
                    Ok(Err(err)) => {
                        warn!(error = %err, "mirror reconciliation failed");
                    }
                    Err(_) => {
                        warn!(
                            timeout_secs = job_timeout.as_secs(),
                            "mirror reconciliation timed out"
                        );
                    }
                }
            })
        })
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        Ok(scheduler)
    }

    async fn reconcile(
        store: Arc<dyn BookingStore>,
        dispatcher: Arc<SideEffectDispatcher>,
        batch_size: usize,
    ) -> slotwise_domain::Result<usize> {
        let pending = store.pending_side_effects(Utc::now(), batch_size).await?;
        let mut reconciled = 0;

        for booking in &pending {
            match dispatcher.on_booking_confirmed(booking).await {
                Ok(()) => reconciled += 1,
                Err(err) => {
                    warn!(booking_id = %booking.id, error = %err, "reconciliation attempt failed");
                }
            }
        }

        Ok(reconciled)
    }
}

impl Drop for MirrorScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("MirrorScheduler dropped while running");
        }
    }
}
