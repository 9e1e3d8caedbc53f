//! Reminder tasks owned by the side-effect dispatcher.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SlotwiseError;

/// Dispatch state of a reminder.
///
/// `Skipped` is terminal and recorded when a booking is made inside the
/// lead window; a late reminder is never fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderState {
    Scheduled,
    Sent,
    Failed,
    Skipped,
}

impl ReminderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl FromStr for ReminderState {
    type Err = SlotwiseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "scheduled" => Ok(Self::Scheduled),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            other => Err(SlotwiseError::InvalidInput(format!("unknown reminder state: {other}"))),
        }
    }
}

/// One reminder per confirmed booking, keyed by booking id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderTask {
    pub booking_id: String,
    pub fire_at: DateTime<Utc>,
    pub state: ReminderState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReminderTask {
    pub fn new(
        booking_id: impl Into<String>,
        fire_at: DateTime<Utc>,
        state: ReminderState,
        now: DateTime<Utc>,
    ) -> Self {
        Self { booking_id: booking_id.into(), fire_at, state, created_at: now, updated_at: now }
    }
}
