//! Booking root entity and its status machine.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::SlotwiseError;
use crate::types::catalog::Service;
use crate::types::time::TimeRange;

/// Booking lifecycle status.
///
/// `Pending → Confirmed → Cancelled` and `Pending → Cancelled`; `Cancelled`
/// is terminal. `Pending` is only observable while a two-phase external
/// calendar push is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Active bookings participate in the overlap invariant.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl FromStr for BookingStatus {
    type Err = SlotwiseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(SlotwiseError::InvalidInput(format!("unknown booking status: {other}"))),
        }
    }
}

/// The root entity of the scheduling core.
///
/// Invariant: per staff member, the guard windows of active bookings never
/// overlap. Time changes are cancel + recreate, never in-place mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub staff_id: String,
    pub service_id: String,
    pub client_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Appointment window widened by the service's buffers; the region the
    /// conditional reserve checks against other active bookings.
    pub guard_start: DateTime<Utc>,
    pub guard_end: DateTime<Utc>,
    pub status: BookingStatus,
    pub external_event_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Build a confirmed booking for `service` starting at `start`.
    pub fn confirmed(
        staff_id: impl Into<String>,
        service: &Service,
        client_id: impl Into<String>,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let window = service.slot_window(start);
        let guard = service.guard_window(start);
        Self {
            id: Uuid::now_v7().to_string(),
            staff_id: staff_id.into(),
            service_id: service.id.clone(),
            client_id: client_id.into(),
            start: window.start,
            end: window.end,
            guard_start: guard.start,
            guard_end: guard.end,
            status: BookingStatus::Confirmed,
            external_event_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The appointment window `[start, end)`.
    pub fn window(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// The buffered window checked by the overlap invariant.
    pub fn guard_window(&self) -> TimeRange {
        TimeRange::new(self.guard_start, self.guard_end)
    }
}
