//! Google Calendar integration
//!
//! Provides the external busy feed, the booking mirror, and the per-staff
//! OAuth token lifecycle. The external calendar is never authoritative for
//! conflict detection; it is a mirror plus a best-effort busy source.

pub mod oauth;
pub mod providers;
pub mod sync;
pub mod token_provider;
pub mod types;

pub use oauth::GoogleAuthFlow;
pub use providers::{AccessTokenProvider, BusyPeriod, CalendarApi, EventPayload, GoogleCalendarApi};
pub use sync::CalendarSyncService;
pub use token_provider::GoogleTokenProvider;
pub use types::{TokenExchange, TokenRefresh};
