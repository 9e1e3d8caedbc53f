//! Calendar provider implementations.

pub mod google;
pub mod traits;

pub use google::GoogleCalendarApi;
pub use traits::{AccessTokenProvider, BusyPeriod, CalendarApi, EventPayload};
