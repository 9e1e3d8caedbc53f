//! SQLite implementation of the BookingStore port.
//!
//! The reserve path runs the overlap check and the insert inside one
//! `BEGIN IMMEDIATE` transaction, so concurrent reservations serialize on
//! the database write lock and exactly one of any overlapping set commits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row, ToSql, TransactionBehavior};
use slotwise_core::booking::ports::BookingStore;
use slotwise_domain::{Booking, BookingStatus, Result, SlotwiseError, TimeRange};
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

const BOOKING_COLUMNS: &str = "id, staff_id, service_id, client_id, start_ts, end_ts,
        guard_start_ts, guard_end_ts, status, external_event_ref, created_at, updated_at";

/// SQLite implementation of the booking store.
pub struct SqliteBookingStore {
    db: Arc<DbManager>,
}

impl SqliteBookingStore {
    /// Create a new booking store.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingStore for SqliteBookingStore {
    #[instrument(skip(self, booking), fields(booking_id = %booking.id, staff_id = %booking.staff_id))]
    async fn reserve(&self, booking: &Booking) -> Result<Booking> {
        let mut conn = self.db.get_connection()?;

        // BEGIN IMMEDIATE takes the write lock up front; the overlap check
        // and insert below are atomic with respect to other reservers.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(InfraError::from)?;

        let conflicts: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM bookings
                 WHERE staff_id = ?1
                   AND status IN ('pending', 'confirmed')
                   AND guard_start_ts < ?2
                   AND guard_end_ts > ?3",
                params![
                    booking.staff_id,
                    booking.guard_end.timestamp(),
                    booking.guard_start.timestamp()
                ],
                |row| row.get(0),
            )
            .map_err(InfraError::from)?;

        if conflicts > 0 {
            debug!(conflicts, "reserve rejected; window already taken");
            return Err(SlotwiseError::Conflict("slot window is no longer free".into()));
        }

        tx.execute(
            "INSERT INTO bookings (
                id, staff_id, service_id, client_id, start_ts, end_ts,
                guard_start_ts, guard_end_ts, status, external_event_ref,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                booking.id,
                booking.staff_id,
                booking.service_id,
                booking.client_id,
                booking.start.timestamp(),
                booking.end.timestamp(),
                booking.guard_start.timestamp(),
                booking.guard_end.timestamp(),
                booking.status.as_str(),
                booking.external_event_ref,
                booking.created_at.timestamp(),
                booking.updated_at.timestamp(),
            ],
        )
        .map_err(|err| match err {
            // The partial unique index is the backstop when two reservers
            // target the identical start instant.
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ffi::ErrorCode::ConstraintViolation =>
            {
                SlotwiseError::Conflict("slot window is no longer free".into())
            }
            other => InfraError::from(other).into(),
        })?;

        tx.commit().map_err(InfraError::from)?;

        debug!("booking reserved");
        Ok(booking.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, booking_id: &str) -> Result<Option<Booking>> {
        let conn = self.db.get_connection()?;

        let result = conn.query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![booking_id],
            row_to_booking,
        );

        match result {
            Ok(booking) => Ok(Some(booking)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    #[instrument(skip(self))]
    async fn mark_cancelled(&self, booking_id: &str, now: DateTime<Utc>) -> Result<Booking> {
        let conn = self.db.get_connection()?;

        let changed = conn
            .execute(
                "UPDATE bookings SET status = 'cancelled', updated_at = ?2
                 WHERE id = ?1 AND status != 'cancelled'",
                params![booking_id, now.timestamp()],
            )
            .map_err(InfraError::from)?;

        let row = conn
            .query_row(
                &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
                params![booking_id],
                row_to_booking,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    SlotwiseError::NotFound(format!("booking {booking_id}"))
                }
                other => InfraError::from(other).into(),
            })?;

        debug!(changed, "booking cancelled");
        Ok(row)
    }

    #[instrument(skip(self))]
    async fn active_in_range(&self, staff_id: &str, range: TimeRange) -> Result<Vec<Booking>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE staff_id = ?1
                   AND status IN ('pending', 'confirmed')
                   AND guard_start_ts < ?2
                   AND guard_end_ts > ?3
                 ORDER BY start_ts ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(
                params![staff_id, range.end.timestamp(), range.start.timestamp()],
                row_to_booking,
            )
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(staff_id, count = rows.len(), "retrieved active bookings");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn set_external_ref(
        &self,
        booking_id: &str,
        external_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "UPDATE bookings SET external_event_ref = ?2, updated_at = ?3 WHERE id = ?1",
            [&booking_id as &dyn ToSql, &external_ref, &now.timestamp()].as_ref(),
        )
        .map_err(InfraError::from)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn pending_side_effects(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Booking>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(
                "SELECT b.id, b.staff_id, b.service_id, b.client_id, b.start_ts, b.end_ts,
                        b.guard_start_ts, b.guard_end_ts, b.status, b.external_event_ref,
                        b.created_at, b.updated_at
                 FROM bookings b
                 LEFT JOIN reminder_tasks r ON r.booking_id = b.id
                 WHERE b.status = 'confirmed'
                   AND b.start_ts > ?1
                   AND (b.external_event_ref IS NULL OR r.booking_id IS NULL)
                 ORDER BY b.start_ts ASC
                 LIMIT ?2",
            )
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![now.timestamp(), limit as i64], row_to_booking)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        Ok(rows)
    }
}

fn row_to_booking(row: &Row<'_>) -> rusqlite::Result<Booking> {
    let status: String = row.get(8)?;
    let status: BookingStatus = status
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(Booking {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        service_id: row.get(2)?,
        client_id: row.get(3)?,
        start: column_ts(row, 4)?,
        end: column_ts(row, 5)?,
        guard_start: column_ts(row, 6)?,
        guard_end: column_ts(row, 7)?,
        status,
        external_event_ref: row.get(9)?,
        created_at: column_ts(row, 10)?,
        updated_at: column_ts(row, 11)?,
    })
}

fn column_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ts: i64 = row.get(idx)?;
    DateTime::from_timestamp(ts, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ts))
}
