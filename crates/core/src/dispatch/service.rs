//! Side-effect dispatcher - core business logic
//!
//! Re-entrant and stateless between invocations: everything it needs is
//! looked up from persisted booking/reminder state, so at-least-once event
//! delivery and periodic external triggering are both safe.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use slotwise_domain::constants::{DEFAULT_REMINDER_BATCH_SIZE, DEFAULT_REMINDER_LEAD_MINUTES};
use slotwise_domain::{
    Booking, BookingStatus, ReminderState, ReminderTask, Result, SlotwiseError,
};
use tracing::{debug, info, instrument, warn};

use super::ports::{CalendarMirror, NotificationSender, ReminderStore};
use crate::availability::ports::CatalogRepository;
use crate::booking::ports::BookingStore;

/// Side-effect dispatcher for booking lifecycle events.
pub struct SideEffectDispatcher {
    catalog: Arc<dyn CatalogRepository>,
    store: Arc<dyn BookingStore>,
    reminders: Arc<dyn ReminderStore>,
    mirror: Arc<dyn CalendarMirror>,
    notifier: Arc<dyn NotificationSender>,
    reminder_lead: Duration,
    reminder_batch: usize,
}

impl SideEffectDispatcher {
    /// Create a new dispatcher with default lead time and batch size.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        store: Arc<dyn BookingStore>,
        reminders: Arc<dyn ReminderStore>,
        mirror: Arc<dyn CalendarMirror>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            catalog,
            store,
            reminders,
            mirror,
            notifier,
            reminder_lead: Duration::minutes(DEFAULT_REMINDER_LEAD_MINUTES),
            reminder_batch: DEFAULT_REMINDER_BATCH_SIZE,
        }
    }

    /// Override how long before the booking start the reminder fires.
    pub fn with_reminder_lead(mut self, lead: Duration) -> Self {
        self.reminder_lead = lead;
        self
    }

    /// Override how many due reminders one trigger invocation processes.
    pub fn with_reminder_batch(mut self, batch: usize) -> Self {
        self.reminder_batch = batch;
        self
    }

    /// Handle a confirmed booking.
    ///
    /// Idempotent on the booking id: duplicate invocations never create a
    /// second reminder or a second calendar event.
    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    pub async fn on_booking_confirmed(&self, booking: &Booking) -> Result<()> {
        self.ensure_reminder(booking).await?;
        self.ensure_mirror(booking).await
    }

    /// Handle a cancelled booking: drop the pending reminder and retract
    /// the calendar mirror.
    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    pub async fn on_booking_cancelled(&self, booking: &Booking) -> Result<()> {
        if self.reminders.delete_scheduled(&booking.id).await? {
            debug!("scheduled reminder removed");
        }

        let Some(external_ref) = booking.external_event_ref.as_deref() else {
            return Ok(());
        };

        let Some(staff) = self.catalog.find_staff(&booking.staff_id).await? else {
            warn!(staff_id = %booking.staff_id, "staff missing; cannot retract mirror");
            return Ok(());
        };

        self.mirror.retract_booking(&staff, external_ref).await?;
        self.store.set_external_ref(&booking.id, None, Utc::now()).await?;
        debug!(external_ref, "calendar mirror retracted");
        Ok(())
    }

    /// Dispatch all reminders that are due at `now`; returns how many were
    /// sent.
    ///
    /// Invoked by the external time-based trigger, never by an in-process
    /// timer.
    #[instrument(skip(self))]
    pub async fn fire_due_reminders(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.reminders.due(now, self.reminder_batch).await?;
        let mut sent = 0;

        for task in due {
            let Some(booking) = self.store.find_by_id(&task.booking_id).await? else {
                warn!(booking_id = %task.booking_id, "reminder points at missing booking");
                self.reminders.mark(&task.booking_id, ReminderState::Failed, now).await?;
                continue;
            };

            // Cancellation deletes scheduled reminders, so this only guards
            // against a cancel racing the trigger.
            if booking.status != BookingStatus::Confirmed {
                self.reminders.mark(&task.booking_id, ReminderState::Skipped, now).await?;
                continue;
            }

            let message = self.reminder_message(&booking).await;
            match self.notifier.send(&booking.client_id, &message).await {
                Ok(()) => {
                    self.reminders.mark(&task.booking_id, ReminderState::Sent, now).await?;
                    sent += 1;
                }
                Err(err) => {
                    warn!(booking_id = %task.booking_id, error = %err, "reminder delivery failed");
                    self.reminders.mark(&task.booking_id, ReminderState::Failed, now).await?;
                }
            }
        }

        if sent > 0 {
            info!(sent, "reminders dispatched");
        }
        Ok(sent)
    }

    async fn ensure_reminder(&self, booking: &Booking) -> Result<()> {
        let now = Utc::now();
        let fire_at = booking.start - self.reminder_lead;

        // Last-minute bookings record a terminal Skipped outcome instead of
        // firing late.
        let state =
            if fire_at <= now { ReminderState::Skipped } else { ReminderState::Scheduled };

        let task = ReminderTask::new(&booking.id, fire_at, state, now);
        if self.reminders.create_if_absent(&task).await? {
            debug!(fire_at = %fire_at, state = state.as_str(), "reminder recorded");
        } else {
            debug!("reminder already recorded");
        }
        Ok(())
    }

    async fn ensure_mirror(&self, booking: &Booking) -> Result<()> {
        // Re-read the row so duplicate invocations observe a ref written by
        // an earlier attempt.
        let current = self
            .store
            .find_by_id(&booking.id)
            .await?
            .ok_or_else(|| SlotwiseError::NotFound(format!("booking {}", booking.id)))?;
        if current.external_event_ref.is_some() {
            return Ok(());
        }

        let Some(staff) = self.catalog.find_staff(&booking.staff_id).await? else {
            warn!(staff_id = %booking.staff_id, "staff missing; cannot mirror booking");
            return Ok(());
        };

        match self.mirror.push_booking(&staff, &current).await {
            Ok(external_ref) => {
                self.store.set_external_ref(&booking.id, Some(&external_ref), Utc::now()).await?;
                debug!(%external_ref, "booking mirrored to external calendar");
                Ok(())
            }
            Err(SlotwiseError::AuthExpired(reason)) => {
                debug!(%reason, "calendar not linked; mirror skipped");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn reminder_message(&self, booking: &Booking) -> String {
        let service_name = self
            .catalog
            .find_service(&booking.service_id)
            .await
            .ok()
            .flatten()
            .map_or_else(|| booking.service_id.clone(), |service| service.name);

        format!(
            "Reminder: your {} appointment starts at {}",
            service_name,
            booking.start.to_rfc3339()
        )
    }
}
