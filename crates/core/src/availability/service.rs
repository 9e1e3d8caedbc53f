//! Availability calculator - core business logic

use std::sync::Arc;

use chrono::Duration;
use slotwise_domain::constants::DEFAULT_MAX_RANGE_DAYS;
use slotwise_domain::{AvailabilityOutcome, Result, Slot, SlotwiseError, TimeRange};
use tracing::{instrument, warn};

use super::ports::{CatalogRepository, ExternalBusyFeed};
use super::{intervals, schedule};
use crate::booking::ports::BookingStore;

/// Availability calculator service
///
/// Computes free slots from working hours, internal bookings, and the
/// external busy feed. Computation is pure given the busy snapshot; reads
/// may be stale relative to concurrent commits, which is acceptable because
/// booking commits re-validate.
pub struct AvailabilityService {
    catalog: Arc<dyn CatalogRepository>,
    bookings: Arc<dyn BookingStore>,
    busy_feed: Arc<dyn ExternalBusyFeed>,
    max_range_days: i64,
}

impl AvailabilityService {
    /// Create a new availability service.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        bookings: Arc<dyn BookingStore>,
        busy_feed: Arc<dyn ExternalBusyFeed>,
    ) -> Self {
        Self { catalog, bookings, busy_feed, max_range_days: DEFAULT_MAX_RANGE_DAYS }
    }

    /// Override the maximum queryable window.
    pub fn with_max_range_days(mut self, days: i64) -> Self {
        self.max_range_days = days;
        self
    }

    /// Compute the ordered free slots for a staff member and service within
    /// `range`.
    ///
    /// The outcome's `degraded` flag is set when the external calendar could
    /// not be consulted and only internal bookings were subtracted.
    #[instrument(skip(self), fields(staff_id, service_id))]
    pub async fn compute_slots(
        &self,
        staff_id: &str,
        service_id: &str,
        range: TimeRange,
    ) -> Result<AvailabilityOutcome> {
        self.validate_range(range)?;

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

        let open = schedule::expand_open_windows(&staff, range)?;

        let mut busy: Vec<TimeRange> = self
            .bookings
            .active_in_range(staff_id, range)
            .await?
            .iter()
            .map(|booking| booking.guard_window())
            .collect();

        let degraded = match self.busy_feed.fetch_busy(&staff, range).await {
            Ok(external) => {
                busy.extend(external.into_iter().map(|interval| interval.window));
                false
            }
            Err(err) if err.is_calendar_degraded() => {
                warn!(staff_id, error = %err, "external busy feed unavailable; internal data only");
                true
            }
            Err(err) => return Err(err),
        };

        // A candidate slot's guard window must clear every busy interval, so
        // each busy start absorbs the post-slot buffer and each busy end the
        // pre-slot buffer.
        let busy = intervals::merge(
            busy.into_iter()
                .map(|interval| interval.widened(service.buffer_after(), service.buffer_before()))
                .collect(),
        );

        let mut slots = Vec::new();
        for window in open {
            for free in intervals::subtract(window, &busy) {
                for slot_window in intervals::slice(free, service.duration()) {
                    slots.push(Slot {
                        staff_id: staff_id.to_string(),
                        service_id: service_id.to_string(),
                        window: slot_window,
                    });
                }
            }
        }
        slots.sort_by_key(|slot| slot.window.start);

        Ok(AvailabilityOutcome { slots, degraded })
    }

    fn validate_range(&self, range: TimeRange) -> Result<()> {
        if range.is_empty() {
            return Err(SlotwiseError::InvalidRange(
                "range end must be after range start".into(),
            ));
        }
        if range.duration() > Duration::days(self.max_range_days) {
            return Err(SlotwiseError::InvalidRange(format!(
                "range exceeds the {}-day maximum",
                self.max_range_days
            )));
        }
        Ok(())
    }
}
