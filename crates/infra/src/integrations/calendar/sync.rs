//! Calendar sync service: busy feed inward, booking mirror outward.
//!
//! Implements the core `ExternalBusyFeed` and `CalendarMirror` ports on top
//! of the provider API and the per-staff token provider. Pushes retry with
//! bounded exponential backoff; the internal booking always stands
//! regardless of mirror outcome.

use std::sync::Arc;

use async_trait::async_trait;
use slotwise_core::dispatch::ports::CalendarMirror;
use slotwise_core::ExternalBusyFeed;
use slotwise_domain::constants::DEFAULT_PUSH_MAX_ATTEMPTS;
use slotwise_domain::{
    Booking, BusyInterval, BusySource, Result, SlotwiseError, StaffMember, TimeRange,
};
use tracing::{debug, instrument, warn};

use super::providers::{AccessTokenProvider, CalendarApi, EventPayload};

/// Calendar sync service
pub struct CalendarSyncService {
    api: Arc<dyn CalendarApi>,
    tokens: Arc<dyn AccessTokenProvider>,
    push_max_attempts: u32,
}

impl CalendarSyncService {
    /// Create a new sync service.
    pub fn new(api: Arc<dyn CalendarApi>, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { api, tokens, push_max_attempts: DEFAULT_PUSH_MAX_ATTEMPTS }
    }

    /// Override the bounded retry budget for pushes and retractions.
    pub fn with_push_max_attempts(mut self, attempts: u32) -> Self {
        self.push_max_attempts = attempts.max(1);
        self
    }

    fn event_payload(booking: &Booking) -> EventPayload {
        EventPayload {
            summary: format!("Booked: {}", booking.service_id),
            description: Some(format!("slotwise booking {}", booking.id)),
            window: booking.window(),
        }
    }
}

#[async_trait]
impl ExternalBusyFeed for CalendarSyncService {
    #[instrument(skip(self, staff), fields(staff_id = %staff.id))]
    async fn fetch_busy(
        &self,
        staff: &StaffMember,
        range: TimeRange,
    ) -> Result<Vec<BusyInterval>> {
        let token = self.tokens.access_token(&staff.id).await?;
        let periods = self.api.query_busy(&token, &staff.calendar_id, range).await?;

        debug!(count = periods.len(), "external busy periods fetched");

        Ok(periods
            .into_iter()
            .map(|period| {
                BusyInterval::new(
                    &staff.id,
                    TimeRange::new(period.start, period.end),
                    BusySource::ExternalCalendar,
                )
            })
            .filter(|interval| !interval.window.is_empty())
            .collect())
    }
}

#[async_trait]
impl CalendarMirror for CalendarSyncService {
    #[instrument(skip(self, staff, booking), fields(booking_id = %booking.id))]
    async fn push_booking(&self, staff: &StaffMember, booking: &Booking) -> Result<String> {
        let event = Self::event_payload(booking);

        let mut attempt = 0;
        loop {
            let token = self.tokens.access_token(&staff.id).await?;
            match self.api.insert_event(&token, &staff.calendar_id, &event).await {
                Ok(event_ref) => return Ok(event_ref),
                // Re-authentication needs the user; retrying is pointless
                Err(err @ SlotwiseError::AuthExpired(_)) => return Err(err),
                Err(err) if attempt + 1 < self.push_max_attempts => {
                    let delay = calculate_backoff(attempt);
                    warn!(attempt, delay_ms = delay, error = %err, "event push failed; retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    #[instrument(skip(self, staff), fields(staff_id = %staff.id))]
    async fn retract_booking(&self, staff: &StaffMember, external_ref: &str) -> Result<()> {
        let mut attempt = 0;
        loop {
            let token = self.tokens.access_token(&staff.id).await?;
            match self.api.delete_event(&token, &staff.calendar_id, external_ref).await {
                Ok(()) => return Ok(()),
                Err(err @ SlotwiseError::AuthExpired(_)) => return Err(err),
                Err(err) if attempt + 1 < self.push_max_attempts => {
                    let delay = calculate_backoff(attempt);
                    warn!(attempt, delay_ms = delay, error = %err, "event retraction failed; retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Calculate exponential backoff delay with jitter, in milliseconds.
pub fn calculate_backoff(attempt: u32) -> u64 {
    let base_delay = 500u64;
    let max_delay = 15_000u64;

    let delay = base_delay * 2u64.pow(attempt.min(5));
    let capped_delay = delay.min(max_delay);

    // Add ±25% jitter
    use rand::Rng;
    let jitter_range = (capped_delay as f64 * 0.25) as u64;
    let mut rng = rand::thread_rng();
    let jitter = rng.gen_range(0..=jitter_range * 2) as i64 - jitter_range as i64;

    (capped_delay as i64 + jitter).max(0) as u64
}
