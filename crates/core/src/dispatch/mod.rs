//! Side-effect dispatch: reminders and calendar mirroring.

pub mod ports;
pub mod service;

pub use service::SideEffectDispatcher;
