//! Domain types and models

pub mod booking;
pub mod busy;
pub mod catalog;
pub mod reminder;
pub mod slot;
pub mod time;

pub use booking::{Booking, BookingStatus};
pub use busy::{BusyInterval, BusySource};
pub use catalog::{LocalWindow, ScheduleOverride, Service, StaffMember, WeeklySchedule};
pub use reminder::{ReminderState, ReminderTask};
pub use slot::{AvailabilityOutcome, Slot};
pub use time::TimeRange;
