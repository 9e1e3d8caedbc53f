//! Scheduling infrastructure for time-triggered invocations
//!
//! The core never runs an in-process timer of its own; these cron-based
//! schedulers are the external triggers that periodically invoke the
//! side-effect dispatcher:
//! - Reminder scheduler (fires due reminders)
//! - Mirror scheduler (reconciles bookings missing calendar side effects)
//!
//! Both follow the same rules: explicit lifecycle management (start/stop),
//! timeout wrapping on job bodies, and a warning on drop while running.

pub mod error;
pub mod mirror_scheduler;
pub mod reminder_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use mirror_scheduler::{MirrorScheduler, MirrorSchedulerConfig};
pub use reminder_scheduler::{ReminderScheduler, ReminderSchedulerConfig};
