//! Busy intervals consumed by the availability calculator.

use serde::{Deserialize, Serialize};

use crate::types::time::TimeRange;

/// Where a busy interval originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusySource {
    InternalBooking,
    ExternalCalendar,
}

impl BusySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalBooking => "internal-booking",
            Self::ExternalCalendar => "external-calendar",
        }
    }
}

/// A time range during which a staff member is unavailable.
///
/// Derived from bookings or the external calendar feed; never persisted
/// independently of its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusyInterval {
    pub staff_id: String,
    pub window: TimeRange,
    pub source: BusySource,
}

impl BusyInterval {
    pub fn new(staff_id: impl Into<String>, window: TimeRange, source: BusySource) -> Self {
        Self { staff_id: staff_id.into(), window, source }
    }
}
