//! Service catalog and staff schedule types.

use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::time::TimeRange;

/// A bookable service offered by the business.
///
/// Services are immutable once referenced by a booking; edits create new
/// rows that only apply to future bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub price_cents: i64,
}

impl Service {
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn buffer_before(&self) -> Duration {
        Duration::minutes(i64::from(self.buffer_before_minutes))
    }

    pub fn buffer_after(&self) -> Duration {
        Duration::minutes(i64::from(self.buffer_after_minutes))
    }

    /// Appointment window for a slot starting at `start`.
    pub fn slot_window(&self, start: DateTime<Utc>) -> TimeRange {
        TimeRange::new(start, start + self.duration())
    }

    /// Appointment window plus this service's buffers; the region that must
    /// be free of every other active booking.
    pub fn guard_window(&self, start: DateTime<Utc>) -> TimeRange {
        self.slot_window(start).widened(self.buffer_before(), self.buffer_after())
    }
}

/// One open window within a local day, expressed as minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalWindow {
    pub open_minutes: u32,
    pub close_minutes: u32,
}

impl LocalWindow {
    pub fn new(open_minutes: u32, close_minutes: u32) -> Self {
        Self { open_minutes, close_minutes }
    }
}

/// Weekly working-hours schedule: a set of open windows per weekday.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub windows: Vec<(Weekday, LocalWindow)>,
}

impl WeeklySchedule {
    /// Open windows for the given weekday, ordered by opening time.
    pub fn windows_for(&self, weekday: Weekday) -> Vec<LocalWindow> {
        let mut windows: Vec<LocalWindow> = self
            .windows
            .iter()
            .filter(|(day, _)| *day == weekday)
            .map(|(_, window)| *window)
            .collect();
        windows.sort_by_key(|w| w.open_minutes);
        windows
    }
}

/// Date-specific replacement of the weekly schedule.
///
/// An empty `windows` list closes the date entirely (holiday, one-off
/// closure); a non-empty list replaces the weekday's regular hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub date: NaiveDate,
    pub windows: Vec<LocalWindow>,
}

/// A staff member who can be booked for services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub display_name: String,
    /// IANA time zone name the weekly schedule is expressed in.
    pub time_zone: String,
    /// External calendar this staff member's bookings are mirrored into.
    pub calendar_id: String,
    pub weekly: WeeklySchedule,
    pub overrides: Vec<ScheduleOverride>,
}

impl StaffMember {
    /// Open windows on a local date, with date overrides taking precedence
    /// over the weekly schedule.
    pub fn windows_on(&self, date: NaiveDate, weekday: Weekday) -> Vec<LocalWindow> {
        if let Some(over) = self.overrides.iter().find(|o| o.date == date) {
            let mut windows = over.windows.clone();
            windows.sort_by_key(|w| w.open_minutes);
            return windows;
        }
        self.weekly.windows_for(weekday)
    }
}
