//! SQLite storage for per-staff external calendar credentials.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use slotwise_domain::Result;
use tracing::{debug, instrument};

use super::manager::DbManager;
use crate::errors::InfraError;

/// Credentials stored for one staff member's calendar account.
#[derive(Debug, Clone)]
pub struct StoredTokens {
    pub staff_id: String,
    pub refresh_token: String,
    pub access_token: Option<String>,
    pub access_expires_at: Option<DateTime<Utc>>,
}

/// SQLite-backed token storage, keyed per staff member.
pub struct SqliteTokenRepository {
    db: Arc<DbManager>,
}

impl SqliteTokenRepository {
    /// Create a new token repository.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Load the stored credentials for a staff member.
    #[instrument(skip(self))]
    pub fn find(&self, staff_id: &str) -> Result<Option<StoredTokens>> {
        let conn = self.db.get_connection()?;

        conn.query_row(
            "SELECT staff_id, refresh_token, access_token, access_expires_ts
             FROM calendar_tokens WHERE staff_id = ?1",
            params![staff_id],
            |row| {
                let expires: Option<i64> = row.get(3)?;
                Ok(StoredTokens {
                    staff_id: row.get(0)?,
                    refresh_token: row.get(1)?,
                    access_token: row.get(2)?,
                    access_expires_at: expires.and_then(|ts| DateTime::from_timestamp(ts, 0)),
                })
            },
        )
        .optional()
        .map_err(|e| InfraError::from(e).into())
    }

    /// Store credentials after a completed OAuth exchange.
    #[instrument(skip(self, refresh_token, access_token))]
    pub fn upsert(
        &self,
        staff_id: &str,
        refresh_token: &str,
        access_token: Option<&str>,
        access_expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "INSERT INTO calendar_tokens
                (staff_id, refresh_token, access_token, access_expires_ts, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(staff_id) DO UPDATE SET
                refresh_token = excluded.refresh_token,
                access_token = excluded.access_token,
                access_expires_ts = excluded.access_expires_ts,
                updated_at = excluded.updated_at",
            params![
                staff_id,
                refresh_token,
                access_token,
                access_expires_at.map(|dt| dt.timestamp()),
                Utc::now().timestamp(),
            ],
        )
        .map_err(InfraError::from)?;

        debug!("calendar tokens stored");
        Ok(())
    }

    /// Update the cached access token after a refresh.
    #[instrument(skip(self, access_token))]
    pub fn update_access_token(
        &self,
        staff_id: &str,
        access_token: &str,
        access_expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "UPDATE calendar_tokens
             SET access_token = ?2, access_expires_ts = ?3, updated_at = ?4
             WHERE staff_id = ?1",
            params![
                staff_id,
                access_token,
                access_expires_at.timestamp(),
                Utc::now().timestamp()
            ],
        )
        .map_err(InfraError::from)?;

        Ok(())
    }

    /// Remove credentials, unlinking the account.
    #[instrument(skip(self))]
    pub fn delete(&self, staff_id: &str) -> Result<bool> {
        let conn = self.db.get_connection()?;

        let deleted = conn
            .execute("DELETE FROM calendar_tokens WHERE staff_id = ?1", params![staff_id])
            .map_err(InfraError::from)?;

        Ok(deleted > 0)
    }
}
