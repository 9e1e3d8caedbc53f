//! Shared in-memory test doubles for core service tests.
#![allow(dead_code)]

pub mod calendar;
pub mod stores;

use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};
use slotwise_domain::{LocalWindow, Service, StaffMember, TimeRange, WeeklySchedule};

/// 2026-03-02 is a Monday; most fixtures live on that date.
pub fn monday(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, min, 0).unwrap()
}

pub fn monday_range(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeRange {
    TimeRange::new(monday(h1, m1), monday(h2, m2))
}

/// First Monday at least a week out, so booking-creation fixtures always
/// start in the future.
pub fn future_monday(hour: u32, min: u32) -> DateTime<Utc> {
    let mut date = Utc::now().date_naive() + chrono::Duration::days(7);
    while date.weekday() != Weekday::Mon {
        date = date.succ_opt().unwrap();
    }
    date.and_hms_opt(hour, min, 0).unwrap().and_utc()
}

/// 30-minute service without buffers.
pub fn service_30min() -> Service {
    Service {
        id: "svc-consult".into(),
        name: "Consultation".into(),
        duration_minutes: 30,
        buffer_before_minutes: 0,
        buffer_after_minutes: 0,
        price_cents: 5000,
    }
}

/// Staff member working Mondays 09:00-12:00 UTC.
pub fn staff_morning() -> StaffMember {
    StaffMember {
        id: "stf-dana".into(),
        display_name: "Dana".into(),
        time_zone: "UTC".into(),
        calendar_id: "primary".into(),
        weekly: WeeklySchedule {
            windows: vec![(Weekday::Mon, LocalWindow::new(9 * 60, 12 * 60))],
        },
        overrides: vec![],
    }
}
