//! # Slotwise Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The availability calculator (working hours, busy subtraction, slot
//!   slicing)
//! - The booking transaction manager (conditional reserve, cancellation)
//! - The side-effect dispatcher (reminders, calendar mirroring)
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `slotwise-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod availability;
pub mod booking;
pub mod dispatch;

// Re-export specific items to avoid ambiguity
pub use availability::ports::{CatalogRepository, ExternalBusyFeed};
pub use availability::AvailabilityService;
pub use booking::ports::BookingStore;
pub use booking::BookingService;
pub use dispatch::ports::{CalendarMirror, NotificationSender, ReminderStore};
pub use dispatch::SideEffectDispatcher;
