//! Shared harness for infra integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use slotwise_domain::{LocalWindow, Service, StaffMember, WeeklySchedule};
use slotwise_infra::{DbManager, SqliteCatalogRepository};
use tempfile::TempDir;

/// Isolated database with migrations applied and a seeded catalog.
pub struct DbHarness {
    #[allow(dead_code)]
    temp_dir: TempDir,
    pub manager: Arc<DbManager>,
}

impl DbHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temporary directory should be created");
        let db_path = temp_dir.path().join("infra-integration.db");

        let manager =
            Arc::new(DbManager::new(&db_path, 4).expect("database manager should initialise"));
        manager.run_migrations().expect("schema migrations should apply");

        Self { temp_dir, manager }
    }

    /// Seed the default service and staff member fixtures.
    pub fn seed_catalog(&self) -> SqliteCatalogRepository {
        let catalog = SqliteCatalogRepository::new(Arc::clone(&self.manager));
        catalog.upsert_service(&service_30min()).expect("service seeded");
        catalog.upsert_staff(&staff_weekdays()).expect("staff seeded");
        catalog
    }
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

/// Staff member working weekdays 09:00-17:00 UTC.
pub fn staff_weekdays() -> StaffMember {
    let window = LocalWindow::new(9 * 60, 17 * 60);
    StaffMember {
        id: "stf-dana".into(),
        display_name: "Dana".into(),
        time_zone: "UTC".into(),
        calendar_id: "primary".into(),
        weekly: WeeklySchedule {
            windows: vec![
                (Weekday::Mon, window),
                (Weekday::Tue, window),
                (Weekday::Wed, window),
                (Weekday::Thu, window),
                (Weekday::Fri, window),
            ],
        },
        overrides: vec![],
    }
}

/// First Monday at least a week out, at the given time of day.
pub fn future_monday(hour: u32, min: u32) -> DateTime<Utc> {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != Weekday::Mon {
        date = date.succ_opt().unwrap();
    }
    date.and_hms_opt(hour, min, 0).unwrap().and_utc()
}

/// Fixed instant helper for deterministic interval assertions.
pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
}
