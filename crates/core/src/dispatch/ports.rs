//! Port interfaces for booking side effects

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slotwise_domain::{Booking, ReminderState, ReminderTask, Result, StaffMember};

/// Trait for persisting reminder tasks, keyed by booking id.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Insert `task` unless one already exists for the booking.
    ///
    /// Returns `true` when a row was inserted. The uniqueness check is the
    /// idempotency guard for at-least-once confirmation delivery.
    async fn create_if_absent(&self, task: &ReminderTask) -> Result<bool>;

    /// Look up the reminder for a booking.
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<ReminderTask>>;

    /// Delete a reminder that is still `Scheduled`. Returns `true` when one
    /// was removed; already-dispatched reminders are left untouched.
    async fn delete_scheduled(&self, booking_id: &str) -> Result<bool>;

    /// Scheduled reminders whose fire time has passed, ordered by fire time.
    async fn due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ReminderTask>>;

    /// Record the dispatch outcome for a reminder.
    async fn mark(&self, booking_id: &str, state: ReminderState, now: DateTime<Utc>)
        -> Result<()>;
}

/// Trait for mirroring bookings into the external calendar.
///
/// The mirror is never authoritative for conflict detection; push failures
/// leave the booking standing and are retried later.
#[async_trait]
pub trait CalendarMirror: Send + Sync {
    /// Create an external calendar event for the booking; returns the
    /// external event reference.
    async fn push_booking(&self, staff: &StaffMember, booking: &Booking) -> Result<String>;

    /// Remove a previously pushed event. Retracting an event that is
    /// already gone is a success.
    async fn retract_booking(&self, staff: &StaffMember, external_ref: &str) -> Result<()>;
}

/// Trait for delivering reminder notifications to clients.
///
/// Transport-level retry is the collaborator's concern, not the core's.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, client_contact: &str, message: &str) -> Result<()>;
}
