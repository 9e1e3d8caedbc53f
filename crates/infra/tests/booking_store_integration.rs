//! End-to-end coverage for the SQLite booking, reminder, catalog, and token
//! repositories against the real workspace schema.
//!
//! Each test runs on an isolated on-disk database with migrations applied.
//! The concurrency tests exercise the conditional reserve with genuinely
//! parallel tasks; they are the teeth behind the "exactly one winner"
//! guarantee.

mod support;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc, Weekday};
use slotwise_core::booking::ports::BookingStore;
use slotwise_core::dispatch::ports::ReminderStore;
use slotwise_core::CatalogRepository;
use slotwise_domain::{
    Booking, BookingStatus, LocalWindow, ReminderState, ReminderTask, ScheduleOverride,
    SlotwiseError, TimeRange,
};
use slotwise_infra::{SqliteBookingStore, SqliteReminderStore, SqliteTokenRepository};
use support::{future_monday, service_30min, DbHarness};

fn booking_at(start: chrono::DateTime<chrono::Utc>, client: &str) -> Booking {
    Booking::confirmed("stf-dana", &service_30min(), client, start, Utc::now())
}

#[tokio::test]
async fn reserve_rejects_overlapping_window() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let store = SqliteBookingStore::new(Arc::clone(&harness.manager));

    let start = future_monday(10, 0);
    store.reserve(&booking_at(start, "client-1")).await.expect("first reserve succeeds");

    // 10:15 overlaps the 10:00-10:30 window
    let err = store
        .reserve(&booking_at(start + Duration::minutes(15), "client-2"))
        .await
        .expect_err("overlap must conflict");
    assert!(matches!(err, SlotwiseError::Conflict(_)));

    // The adjacent 10:30 slot is free under half-open semantics
    store
        .reserve(&booking_at(start + Duration::minutes(30), "client-3"))
        .await
        .expect("adjacent slot reserves");
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reservers_resolve_to_one_winner() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let store = Arc::new(SqliteBookingStore::new(Arc::clone(&harness.manager)));

    let start = future_monday(10, 0);

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        // All eight target windows overlapping 10:00-10:30
        let slot = start + Duration::minutes(i64::from(i % 2) * 15);
        let client = format!("client-{i}");
        handles.push(tokio::spawn(async move {
            store.reserve(&booking_at(slot, &client)).await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(_) => winners += 1,
            Err(SlotwiseError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1, "exactly one concurrent reserver may win");
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn cancelled_booking_frees_the_window() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let store = SqliteBookingStore::new(Arc::clone(&harness.manager));

    let start = future_monday(11, 0);
    let booking = store.reserve(&booking_at(start, "client-1")).await.unwrap();

    let cancelled = store.mark_cancelled(&booking.id, Utc::now()).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    // Cancelling again is stable
    let again = store.mark_cancelled(&booking.id, Utc::now()).await.unwrap();
    assert_eq!(again.status, BookingStatus::Cancelled);

    // The window can be reserved again
    store.reserve(&booking_at(start, "client-2")).await.expect("window freed by cancellation");
}

#[tokio::test]
async fn cancelling_unknown_booking_is_not_found() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let store = SqliteBookingStore::new(Arc::clone(&harness.manager));

    let err = store.mark_cancelled("bk-ghost", Utc::now()).await.unwrap_err();
    assert!(matches!(err, SlotwiseError::NotFound(_)));
}

#[tokio::test]
async fn active_in_range_filters_by_guard_overlap() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let store = SqliteBookingStore::new(Arc::clone(&harness.manager));

    let start = future_monday(9, 0);
    let first = store.reserve(&booking_at(start, "client-1")).await.unwrap();
    store.reserve(&booking_at(start + Duration::hours(2), "client-2")).await.unwrap();
    let cancelled = store.reserve(&booking_at(start + Duration::hours(4), "client-3")).await.unwrap();
    store.mark_cancelled(&cancelled.id, Utc::now()).await.unwrap();

    let range = TimeRange::new(start - Duration::minutes(10), start + Duration::hours(1));
    let active = store.active_in_range("stf-dana", range).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, first.id);

    // Cancelled bookings never count against availability
    let wide = TimeRange::new(start - Duration::hours(1), start + Duration::hours(6));
    let active = store.active_in_range("stf-dana", wide).await.unwrap();
    assert_eq!(active.len(), 2);
}

#[tokio::test]
async fn pending_side_effects_tracks_missing_mirror_and_reminder() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let store = SqliteBookingStore::new(Arc::clone(&harness.manager));
    let reminders = SqliteReminderStore::new(Arc::clone(&harness.manager));

    let start = future_monday(10, 0);
    let booking = store.reserve(&booking_at(start, "client-1")).await.unwrap();

    // Missing both side effects: reported
    let pending = store.pending_side_effects(Utc::now(), 10).await.unwrap();
    assert_eq!(pending.len(), 1);

    // Reminder recorded but mirror still missing: still reported
    let task =
        ReminderTask::new(&booking.id, start - Duration::hours(1), ReminderState::Scheduled, Utc::now());
    assert!(reminders.create_if_absent(&task).await.unwrap());
    let pending = store.pending_side_effects(Utc::now(), 10).await.unwrap();
    assert_eq!(pending.len(), 1);

    // Both present: settled
    store.set_external_ref(&booking.id, Some("ext-1"), Utc::now()).await.unwrap();
    let pending = store.pending_side_effects(Utc::now(), 10).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn reminder_store_roundtrip_and_idempotency() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let store = SqliteBookingStore::new(Arc::clone(&harness.manager));
    let reminders = SqliteReminderStore::new(Arc::clone(&harness.manager));

    let start = future_monday(14, 0);
    let booking = store.reserve(&booking_at(start, "client-1")).await.unwrap();
    let fire_at = start - Duration::hours(1);

    let task = ReminderTask::new(&booking.id, fire_at, ReminderState::Scheduled, Utc::now());
    assert!(reminders.create_if_absent(&task).await.unwrap());
    // Second create is ignored: the booking-id key is the idempotency guard
    assert!(!reminders.create_if_absent(&task).await.unwrap());

    // Not due before the fire time
    assert!(reminders.due(fire_at - Duration::minutes(1), 10).await.unwrap().is_empty());

    let due = reminders.due(fire_at, 10).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].booking_id, booking.id);

    reminders.mark(&booking.id, ReminderState::Sent, Utc::now()).await.unwrap();
    assert!(reminders.due(fire_at, 10).await.unwrap().is_empty());

    // Sent reminders are not deletable as "scheduled"
    assert!(!reminders.delete_scheduled(&booking.id).await.unwrap());
    let task = reminders.find_by_booking(&booking.id).await.unwrap().unwrap();
    assert_eq!(task.state, ReminderState::Sent);
}

#[tokio::test]
async fn catalog_roundtrips_schedule_and_overrides() {
    let harness = DbHarness::new();
    let catalog = harness.seed_catalog();

    let mut staff = support::staff_weekdays();
    staff.overrides.push(ScheduleOverride {
        date: NaiveDate::from_ymd_opt(2027, 1, 4).unwrap(),
        windows: vec![],
    });
    staff.overrides.push(ScheduleOverride {
        date: NaiveDate::from_ymd_opt(2027, 1, 5).unwrap(),
        windows: vec![LocalWindow::new(13 * 60, 16 * 60)],
    });
    catalog.upsert_staff(&staff).unwrap();

    let loaded = catalog.find_staff("stf-dana").await.unwrap().unwrap();
    assert_eq!(loaded.time_zone, "UTC");
    assert_eq!(loaded.weekly.windows_for(Weekday::Mon), vec![LocalWindow::new(9 * 60, 17 * 60)]);
    assert_eq!(loaded.weekly.windows_for(Weekday::Sat), vec![]);

    assert_eq!(loaded.overrides.len(), 2);
    let closed = &loaded.overrides[0];
    assert_eq!(closed.date, NaiveDate::from_ymd_opt(2027, 1, 4).unwrap());
    assert!(closed.windows.is_empty());
    let replaced = &loaded.overrides[1];
    assert_eq!(replaced.windows, vec![LocalWindow::new(13 * 60, 16 * 60)]);

    let service = catalog.find_service("svc-consult").await.unwrap().unwrap();
    assert_eq!(service.duration_minutes, 30);
    assert!(catalog.find_service("svc-ghost").await.unwrap().is_none());
    assert!(catalog.find_staff("stf-ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn token_repository_roundtrip() {
    let harness = DbHarness::new();
    harness.seed_catalog();
    let tokens = SqliteTokenRepository::new(Arc::clone(&harness.manager));

    assert!(tokens.find("stf-dana").unwrap().is_none());

    let expires = Utc::now() + Duration::hours(1);
    tokens.upsert("stf-dana", "refresh-1", Some("access-1"), Some(expires)).unwrap();

    let stored = tokens.find("stf-dana").unwrap().unwrap();
    assert_eq!(stored.refresh_token, "refresh-1");
    assert_eq!(stored.access_token.as_deref(), Some("access-1"));
    assert_eq!(stored.access_expires_at.unwrap().timestamp(), expires.timestamp());

    let new_expiry = Utc::now() + Duration::hours(2);
    tokens.update_access_token("stf-dana", "access-2", new_expiry).unwrap();
    let stored = tokens.find("stf-dana").unwrap().unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("access-2"));

    assert!(tokens.delete("stf-dana").unwrap());
    assert!(tokens.find("stf-dana").unwrap().is_none());
}
