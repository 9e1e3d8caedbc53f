//! SQLite implementation of the ReminderStore port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use slotwise_core::dispatch::ports::ReminderStore;
use slotwise_domain::{ReminderState, ReminderTask, Result};
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of the reminder task store.
pub struct SqliteReminderStore {
    db: Arc<DbManager>,
}

impl SqliteReminderStore {
    /// Create a new reminder store.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderStore for SqliteReminderStore {
    #[instrument(skip(self, task), fields(booking_id = %task.booking_id))]
    async fn create_if_absent(&self, task: &ReminderTask) -> Result<bool> {
        let conn = self.db.get_connection()?;

        // The primary key on booking_id is the idempotency guard.
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO reminder_tasks
                    (booking_id, fire_at_ts, state, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    task.booking_id,
                    task.fire_at.timestamp(),
                    task.state.as_str(),
                    task.created_at.timestamp(),
                    task.updated_at.timestamp(),
                ],
            )
            .map_err(InfraError::from)?;

        debug!(inserted = inserted > 0, "reminder create attempted");
        Ok(inserted > 0)
    }

    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<ReminderTask>> {
        let conn = self.db.get_connection()?;

        let result = conn.query_row(
            "SELECT booking_id, fire_at_ts, state, created_at, updated_at
             FROM reminder_tasks WHERE booking_id = ?1",
            params![booking_id],
            row_to_task,
        );

        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete_scheduled(&self, booking_id: &str) -> Result<bool> {
        let conn = self.db.get_connection()?;

        let deleted = conn
            .execute(
                "DELETE FROM reminder_tasks WHERE booking_id = ?1 AND state = 'scheduled'",
                params![booking_id],
            )
            .map_err(InfraError::from)?;

        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<ReminderTask>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(
                "SELECT booking_id, fire_at_ts, state, created_at, updated_at
                 FROM reminder_tasks
                 WHERE state = 'scheduled' AND fire_at_ts <= ?1
                 ORDER BY fire_at_ts ASC
                 LIMIT ?2",
            )
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![now.timestamp(), limit as i64], row_to_task)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(count = rows.len(), "due reminders loaded");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn mark(
        &self,
        booking_id: &str,
        state: ReminderState,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "UPDATE reminder_tasks SET state = ?2, updated_at = ?3 WHERE booking_id = ?1",
            params![booking_id, state.as_str(), now.timestamp()],
        )
        .map_err(InfraError::from)?;

        Ok(())
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<ReminderTask> {
    let state: String = row.get(2)?;
    let state: ReminderState = state
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(ReminderTask {
        booking_id: row.get(0)?,
        fire_at: column_ts(row, 1)?,
        state,
        created_at: column_ts(row, 3)?,
        updated_at: column_ts(row, 4)?,
    })
}

fn column_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ts: i64 = row.get(idx)?;
    DateTime::from_timestamp(ts, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ts))
}
