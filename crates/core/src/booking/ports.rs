//! Port interfaces for the booking store
//!
//! The store is the single source of truth for the overlap invariant; its
//! conditional-reserve operation is the only serialization point in the
//! system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slotwise_domain::{Booking, Result, TimeRange};

/// Trait for persisting bookings with a conditional-write guarantee.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Atomically insert `booking` if its guard window overlaps no active
    /// booking for the same staff member.
    ///
    /// Concurrent overlapping reservations resolve such that exactly one
    /// succeeds; the rest fail with `Conflict`. Implementations must check
    /// and insert inside a single serialized write, never read-then-write.
    async fn reserve(&self, booking: &Booking) -> Result<Booking>;

    /// Look up a booking by identifier.
    async fn find_by_id(&self, booking_id: &str) -> Result<Option<Booking>>;

    /// Transition a booking to `Cancelled` and return the updated row.
    ///
    /// Fails with `NotFound` for unknown identifiers. Cancelling an
    /// already-cancelled booking returns the row unchanged.
    async fn mark_cancelled(&self, booking_id: &str, now: DateTime<Utc>) -> Result<Booking>;

    /// Active (pending/confirmed) bookings whose guard window overlaps
    /// `range`, ordered by start time.
    async fn active_in_range(&self, staff_id: &str, range: TimeRange) -> Result<Vec<Booking>>;

    /// Record (or clear) the external calendar event reference.
    async fn set_external_ref(
        &self,
        booking_id: &str,
        external_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Future confirmed bookings still missing a calendar mirror or a
    /// reminder record; consumed by the reconciliation pass.
    async fn pending_side_effects(&self, now: DateTime<Utc>, limit: usize)
        -> Result<Vec<Booking>>;
}
