//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Availability computation
pub const DEFAULT_MAX_RANGE_DAYS: i64 = 60;

// Reminder dispatch
pub const DEFAULT_REMINDER_LEAD_MINUTES: i64 = 60;
pub const DEFAULT_REMINDER_CRON: &str = "0 * * * * *"; // every minute
pub const DEFAULT_REMINDER_BATCH_SIZE: usize = 50;

// Calendar mirror reconciliation
pub const DEFAULT_MIRROR_CRON: &str = "0 */5 * * * *"; // every 5 minutes
pub const DEFAULT_PUSH_MAX_ATTEMPTS: u32 = 4;

// Access tokens are refreshed this many seconds before their expiry
pub const TOKEN_REFRESH_SLACK_SECS: i64 = 60;

// Server & storage defaults
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8787/api/v1/auth/google/callback";
