//! Booking transaction manager - core business logic

use std::sync::Arc;

use chrono::{DateTime, Utc};
use slotwise_domain::{Booking, BookingStatus, Result, SlotwiseError};
use tracing::{error, info, instrument, warn};

use super::ports::BookingStore;
use crate::availability::ports::{CatalogRepository, ExternalBusyFeed};
use crate::dispatch::SideEffectDispatcher;

/// Booking transaction manager
///
/// Re-validates the requested window at commit time and delegates the
/// atomic reserve to the store's conditional write. Side effects are
/// enqueued on every successful commit; their failures never fail the
/// booking itself.
pub struct BookingService {
    catalog: Arc<dyn CatalogRepository>,
    store: Arc<dyn BookingStore>,
    busy_feed: Arc<dyn ExternalBusyFeed>,
    dispatcher: Arc<SideEffectDispatcher>,
}

impl BookingService {
    /// Create a new booking service.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        store: Arc<dyn BookingStore>,
        busy_feed: Arc<dyn ExternalBusyFeed>,
        dispatcher: Arc<SideEffectDispatcher>,
    ) -> Self {
        Self { catalog, store, busy_feed, dispatcher }
    }

    /// Reserve a slot for a client.
    ///
    /// Exactly one of any set of concurrent overlapping attempts succeeds;
    /// the rest receive `Conflict` and should re-fetch availability.
    #[instrument(skip(self), fields(staff_id, service_id))]
    pub async fn create_booking(
        &self,
        staff_id: &str,
        service_id: &str,
        client_id: &str,
        slot_start: DateTime<Utc>,
    ) -> Result<Booking> {
        let now = Utc::now();
        if slot_start <= now {
            return Err(SlotwiseError::InvalidInput("slot start must be in the future".into()));
        }

        let service = self
            .catalog
            .find_service(service_id)
            .await?
            .ok_or_else(|| SlotwiseError::NotFound(format!("service {service_id}")))?;
        let staff = self
            .catalog
            .find_staff(staff_id)
            .await?
            .ok_or_else(|| SlotwiseError::NotFound(format!("staff {staff_id}")))?;

        let booking = Booking::confirmed(staff_id, &service, client_id, slot_start, now);

        // Best-effort external re-check. Unavailability degrades to the
        // internal-only check and is logged, never treated as "free".
        match self.busy_feed.fetch_busy(&staff, booking.guard_window()).await {
            Ok(busy) => {
                if busy.iter().any(|interval| interval.window.overlaps(&booking.guard_window())) {
                    return Err(SlotwiseError::Conflict(
                        "slot is busy on the external calendar".into(),
                    ));
                }
            }
            Err(err) if err.is_calendar_degraded() => {
                warn!(staff_id, error = %err, "external calendar check skipped");
            }
            Err(err) => return Err(err),
        }

        // The store's conditional write is the sole arbiter of the overlap
        // invariant.
        let stored = self.store.reserve(&booking).await?;
        info!(booking_id = %stored.id, staff_id, "booking confirmed");

        if let Err(err) = self.dispatcher.on_booking_confirmed(&stored).await {
            error!(booking_id = %stored.id, error = %err, "side-effect dispatch failed; reconciliation will retry");
        }

        Ok(stored)
    }

    /// Cancel a booking.
    ///
    /// Idempotent: cancelling an already-cancelled booking is a no-op
    /// success and triggers no duplicate side effects.
    #[instrument(skip(self))]
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<Booking> {
        let booking = self
            .store
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| SlotwiseError::NotFound(format!("booking {booking_id}")))?;

        if booking.status == BookingStatus::Cancelled {
            return Ok(booking);
        }

        let cancelled = self.store.mark_cancelled(booking_id, Utc::now()).await?;
        info!(booking_id, "booking cancelled");

        if let Err(err) = self.dispatcher.on_booking_cancelled(&cancelled).await {
            error!(booking_id, error = %err, "cancellation side effects incomplete");
        }

        Ok(cancelled)
    }

    /// Look up a booking by identifier.
    ///
    /// This is the re-query path after a commit timeout: callers must not
    /// retry a timed-out commit blindly.
    pub async fn find_booking(&self, booking_id: &str) -> Result<Booking> {
        self.store
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| SlotwiseError::NotFound(format!("booking {booking_id}")))
    }
}
