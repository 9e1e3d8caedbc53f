//! Bookable slots returned by the availability calculator.

use serde::{Deserialize, Serialize};

use crate::types::time::TimeRange;

/// A candidate booking interval of exactly one service's duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub staff_id: String,
    pub service_id: String,
    pub window: TimeRange,
}

/// Result of an availability computation.
///
/// `degraded` is set when the external calendar could not be consulted and
/// the slots were computed from internal data only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityOutcome {
    pub slots: Vec<Slot>,
    pub degraded: bool,
}
