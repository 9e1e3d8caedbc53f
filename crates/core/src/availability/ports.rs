//! Port interfaces for availability computation
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use slotwise_domain::{BusyInterval, Result, Service, StaffMember, TimeRange};

/// Trait for looking up the service catalog and staff roster.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find a service by identifier.
    async fn find_service(&self, service_id: &str) -> Result<Option<Service>>;

    /// Find a staff member (schedule and overrides included) by identifier.
    async fn find_staff(&self, staff_id: &str) -> Result<Option<StaffMember>>;
}

/// Trait for the external calendar's busy-interval feed.
///
/// Implementations fail with `AuthExpired`/`Unreachable` when the external
/// calendar cannot be consulted; callers degrade to internal data only.
#[async_trait]
pub trait ExternalBusyFeed: Send + Sync {
    /// Fetch busy intervals for a staff member within a time range.
    async fn fetch_busy(&self, staff: &StaffMember, range: TimeRange)
        -> Result<Vec<BusyInterval>>;
}
