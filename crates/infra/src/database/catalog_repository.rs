//! SQLite implementation of the CatalogRepository port.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc, Weekday};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension};
use slotwise_core::CatalogRepository;
use slotwise_domain::{
    LocalWindow, Result, ScheduleOverride, Service, StaffMember, WeeklySchedule,
};
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of the service catalog and staff roster.
pub struct SqliteCatalogRepository {
    db: Arc<DbManager>,
}

impl SqliteCatalogRepository {
    /// Create a new catalog repository.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or update a service definition.
    #[instrument(skip(self, service), fields(service_id = %service.id))]
    pub fn upsert_service(&self, service: &Service) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "INSERT INTO services (
                id, name, duration_minutes, buffer_before_minutes,
                buffer_after_minutes, price_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                duration_minutes = excluded.duration_minutes,
                buffer_before_minutes = excluded.buffer_before_minutes,
                buffer_after_minutes = excluded.buffer_after_minutes,
                price_cents = excluded.price_cents",
            params![
                service.id,
                service.name,
                service.duration_minutes,
                service.buffer_before_minutes,
                service.buffer_after_minutes,
                service.price_cents,
                Utc::now().timestamp(),
            ],
        )
        .map_err(InfraError::from)?;

        debug!("service upserted");
        Ok(())
    }

    /// Insert or update a staff member along with hours and overrides.
    #[instrument(skip(self, staff), fields(staff_id = %staff.id))]
    pub fn upsert_staff(&self, staff: &StaffMember) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(InfraError::from)?;

        tx.execute(
            "INSERT INTO staff (id, display_name, time_zone, calendar_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                time_zone = excluded.time_zone,
                calendar_id = excluded.calendar_id",
            params![
                staff.id,
                staff.display_name,
                staff.time_zone,
                staff.calendar_id,
                Utc::now().timestamp(),
            ],
        )
        .map_err(InfraError::from)?;

        tx.execute("DELETE FROM staff_hours WHERE staff_id = ?1", params![staff.id])
            .map_err(InfraError::from)?;
        for (weekday, window) in &staff.weekly.windows {
            tx.execute(
                "INSERT INTO staff_hours (staff_id, weekday, open_minutes, close_minutes)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    staff.id,
                    weekday.num_days_from_monday(),
                    window.open_minutes,
                    window.close_minutes
                ],
            )
            .map_err(InfraError::from)?;
        }

        tx.execute("DELETE FROM staff_overrides WHERE staff_id = ?1", params![staff.id])
            .map_err(InfraError::from)?;
        for over in &staff.overrides {
            let date = over.date.format("%Y-%m-%d").to_string();
            if over.windows.is_empty() {
                tx.execute(
                    "INSERT INTO staff_overrides (staff_id, date, closed)
                     VALUES (?1, ?2, 1)",
                    params![staff.id, date],
                )
                .map_err(InfraError::from)?;
            } else {
                for window in &over.windows {
                    tx.execute(
                        "INSERT INTO staff_overrides
                            (staff_id, date, closed, open_minutes, close_minutes)
                         VALUES (?1, ?2, 0, ?3, ?4)",
                        params![staff.id, date, window.open_minutes, window.close_minutes],
                    )
                    .map_err(InfraError::from)?;
                }
            }
        }

        tx.commit().map_err(InfraError::from)?;

        debug!("staff upserted");
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    #[instrument(skip(self))]
    async fn find_service(&self, service_id: &str) -> Result<Option<Service>> {
        let conn = self.db.get_connection()?;

        conn.query_row(
            "SELECT id, name, duration_minutes, buffer_before_minutes,
                    buffer_after_minutes, price_cents
             FROM services WHERE id = ?1",
            params![service_id],
            |row| {
                Ok(Service {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    duration_minutes: row.get(2)?,
                    buffer_before_minutes: row.get(3)?,
                    buffer_after_minutes: row.get(4)?,
                    price_cents: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(|e| InfraError::from(e).into())
    }

    #[instrument(skip(self))]
    async fn find_staff(&self, staff_id: &str) -> Result<Option<StaffMember>> {
        let conn = self.db.get_connection()?;

        let base = conn
            .query_row(
                "SELECT id, display_name, time_zone, calendar_id FROM staff WHERE id = ?1",
                params![staff_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(InfraError::from)?;

        let Some((id, display_name, time_zone, calendar_id)) = base else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare(
                "SELECT weekday, open_minutes, close_minutes
                 FROM staff_hours WHERE staff_id = ?1
                 ORDER BY weekday, open_minutes",
            )
            .map_err(InfraError::from)?;
        let windows = stmt
            .query_map(params![staff_id], |row| {
                let weekday_num: u8 = row.get(0)?;
                let weekday = Weekday::try_from(weekday_num).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e))
                })?;
                Ok((weekday, LocalWindow::new(row.get(1)?, row.get(2)?)))
            })
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        let mut stmt = conn
            .prepare(
                "SELECT date, closed, open_minutes, close_minutes
                 FROM staff_overrides WHERE staff_id = ?1
                 ORDER BY date, open_minutes",
            )
            .map_err(InfraError::from)?;
        let override_rows = stmt
            .query_map(params![staff_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    LocalWindow::new(row.get(2)?, row.get(3)?),
                ))
            })
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        let mut by_date: BTreeMap<NaiveDate, Vec<LocalWindow>> = BTreeMap::new();
        for (date, closed, window) in override_rows {
            let date = date.parse::<NaiveDate>().map_err(|e| {
                InfraError(slotwise_domain::SlotwiseError::Database(format!(
                    "invalid override date '{date}': {e}"
                )))
            })?;
            let entry = by_date.entry(date).or_default();
            if !closed {
                entry.push(window);
            }
        }

        debug!(windows = windows.len(), overrides = by_date.len(), "staff loaded");

        Ok(Some(StaffMember {
            id,
            display_name,
            time_zone,
            calendar_id,
            weekly: WeeklySchedule { windows },
            overrides: by_date
                .into_iter()
                .map(|(date, windows)| ScheduleOverride { date, windows })
                .collect(),
        }))
    }
}
