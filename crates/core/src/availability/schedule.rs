//! Working-hours expansion: staff schedules to concrete UTC intervals.

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use slotwise_domain::{LocalWindow, Result, SlotwiseError, StaffMember, TimeRange};
use tracing::warn;

/// Expand a staff member's schedule (weekly hours plus date overrides) into
/// open UTC intervals clipped to `range`.
///
/// Windows are resolved in the staff member's own time zone; a date whose
/// override closes it entirely simply contributes no intervals.
pub fn expand_open_windows(staff: &StaffMember, range: TimeRange) -> Result<Vec<TimeRange>> {
    let tz: Tz = staff.time_zone.parse().map_err(|_| {
        SlotwiseError::InvalidInput(format!(
            "staff {} has unknown time zone '{}'",
            staff.id, staff.time_zone
        ))
    })?;

    let mut open = Vec::new();
    let mut date = range.start.with_timezone(&tz).date_naive();
    let last = range.end.with_timezone(&tz).date_naive();

    while date <= last {
        for window in staff.windows_on(date, date.weekday()) {
            if let Some(interval) = resolve_window(&tz, date, window) {
                let clipped = TimeRange::new(
                    interval.start.max(range.start),
                    interval.end.min(range.end),
                );
                if !clipped.is_empty() {
                    open.push(clipped);
                }
            } else {
                warn!(
                    staff_id = %staff.id,
                    %date,
                    open_minutes = window.open_minutes,
                    "skipping unresolvable local window"
                );
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(open)
}

/// Resolve one local window on a date to a UTC interval.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant; times
/// inside a DST gap are rolled forward by an hour.
fn resolve_window(tz: &Tz, date: NaiveDate, window: LocalWindow) -> Option<TimeRange> {
    let open = local_instant(tz, date, window.open_minutes)?;
    let close = local_instant(tz, date, window.close_minutes)?;
    let interval = TimeRange::new(open, close);
    if interval.is_empty() {
        return None;
    }
    Some(interval)
}

fn local_instant(
    tz: &Tz,
    date: NaiveDate,
    minutes_from_midnight: u32,
) -> Option<chrono::DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?
        + Duration::minutes(i64::from(minutes_from_midnight));

    tz.from_local_datetime(&naive)
        .earliest()
        // DST gap: the wall-clock time does not exist, roll forward
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}
