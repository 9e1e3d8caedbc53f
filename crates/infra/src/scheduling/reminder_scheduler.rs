//! Reminder-firing trigger.
//!
//! A cron-based scheduler that periodically asks the side-effect dispatcher
//! "what reminders are due now". The dispatcher is re-entrant and stateless
//! between invocations, so a missed or doubled trigger is harmless.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use slotwise_core::SideEffectDispatcher;
use slotwise_domain::constants::DEFAULT_REMINDER_CRON;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// Cron expression describing the trigger schedule.
    pub cron_expression: String,
    /// Timeout applied to a single trigger invocation.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_REMINDER_CRON.into(),
            job_timeout: Duration::from_secs(60),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

/// Reminder trigger with explicit lifecycle management.
pub struct ReminderScheduler {
    scheduler: Option<JobScheduler>,
    config: ReminderSchedulerConfig,
    dispatcher: Arc<SideEffectDispatcher>,
}

impl ReminderScheduler {
    /// Create a scheduler with the default configuration.
    pub fn new(dispatcher: Arc<SideEffectDispatcher>) -> Self {
        Self::with_config(ReminderSchedulerConfig::default(), dispatcher)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(
        config: ReminderSchedulerConfig,
        dispatcher: Arc<SideEffectDispatcher>,
    ) -> Self {
        Self { scheduler: None, config, dispatcher }
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
        info!(cron = %self.config.cron_expression, "reminder scheduler started");
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

        info!("reminder scheduler stopped");
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

        let dispatcher = self.dispatcher.clone();
        let job_timeout = self.config.job_timeout;

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let dispatcher = dispatcher.clone();

            Box::pin(async move {
                match tokio::time::timeout(job_timeout, dispatcher.fire_due_reminders(Utc::now()))
                    .await
                {
                    Ok(Ok(sent)) => {
                        if sent > 0 {
                            debug!(sent, "reminder trigger completed");
                        }
                    }
                    Ok(Err(err)) => {
                        error!(error = %err, "reminder trigger failed");
                    }
                    Err(_) => {
                        warn!(timeout_secs = job_timeout.as_secs(), "reminder trigger timed out");
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
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ReminderScheduler dropped while running");
        }
    }
}
