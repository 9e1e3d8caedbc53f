//! Configuration structures for the application.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_DB_POOL_SIZE, DEFAULT_MAX_RANGE_DAYS, DEFAULT_MIRROR_CRON,
    DEFAULT_PUSH_MAX_ATTEMPTS, DEFAULT_REDIRECT_URI, DEFAULT_REMINDER_BATCH_SIZE,
    DEFAULT_REMINDER_CRON, DEFAULT_REMINDER_LEAD_MINUTES,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "slotwise.db".to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_BIND_ADDR.to_string() }
    }
}

/// Availability and background-job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Maximum availability query window, in days.
    pub max_range_days: i64,
    /// Reminder fires this many minutes before the booking starts.
    pub reminder_lead_minutes: i64,
    /// Cron expression for the reminder-firing trigger.
    pub reminder_cron: String,
    /// Maximum reminders processed per trigger invocation.
    pub reminder_batch_size: usize,
    /// Cron expression for the calendar-mirror reconciliation pass.
    pub mirror_cron: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
            reminder_lead_minutes: DEFAULT_REMINDER_LEAD_MINUTES,
            reminder_cron: DEFAULT_REMINDER_CRON.to_string(),
            reminder_batch_size: DEFAULT_REMINDER_BATCH_SIZE,
            mirror_cron: DEFAULT_MIRROR_CRON.to_string(),
        }
    }
}

/// External calendar (Google) configuration.
///
/// `client_id`/`client_secret` absent means the OAuth linking surface is
/// disabled; availability then always runs in degraded mode for unlinked
/// staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    /// Bounded attempts for pushing a booking to the external calendar.
    pub push_max_attempts: u32,
    /// Endpoint reminder notifications are POSTed to.
    pub notifier_endpoint: Option<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            push_max_attempts: DEFAULT_PUSH_MAX_ATTEMPTS,
            notifier_endpoint: None,
        }
    }
}
