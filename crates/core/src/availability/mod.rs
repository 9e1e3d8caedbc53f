//! Availability calculation: which slots are actually free.

pub mod intervals;
pub mod ports;
pub mod schedule;
pub mod service;

pub use service::AvailabilityService;
