//! Availability endpoint.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use slotwise_domain::{AvailabilityOutcome, TimeRange};

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub service_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// `GET /api/v1/staff/{staff_id}/slots?service_id&from&to`
///
/// Returns the free slots plus the degraded-accuracy flag. Degraded means
/// the external calendar could not be consulted and callers may want to
/// surface that to the user.
pub async fn get_available_slots(
    State(ctx): State<Arc<AppContext>>,
    Path(staff_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<AvailabilityOutcome>, ApiError> {
    let outcome = ctx
        .availability
        .compute_slots(&staff_id, &query.service_id, TimeRange::new(query.from, query.to))
        .await?;
    Ok(Json(outcome))
}
