//! Provider-side traits for the calendar integration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slotwise_domain::{Result, TimeRange};

/// One busy period reported by the provider's free/busy API.
#[derive(Debug, Clone)]
pub struct BusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Event body pushed into the external calendar.
#[derive(Debug, Clone)]
pub struct EventPayload {
    pub summary: String,
    pub description: Option<String>,
    pub window: TimeRange,
}

/// Raw calendar provider API (free/busy query, event insert/delete).
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Query busy periods for a calendar within a time range.
    async fn query_busy(
        &self,
        access_token: &str,
        calendar_id: &str,
        range: TimeRange,
    ) -> Result<Vec<BusyPeriod>>;

    /// Insert an event; returns the provider's event reference.
    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &EventPayload,
    ) -> Result<String>;

    /// Delete an event. Deleting an event that is already gone succeeds.
    async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_ref: &str,
    ) -> Result<()>;
}

/// Per-account access token capability.
///
/// Scoped per staff member, never a process-wide singleton; fails with
/// `AuthExpired` when the account is unlinked or cannot be refreshed.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self, staff_id: &str) -> Result<String>;
}
