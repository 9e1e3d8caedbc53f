//! Booking endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use slotwise_domain::Booking;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub staff_id: String,
    pub service_id: String,
    pub client_id: String,
    pub start: DateTime<Utc>,
}

/// `POST /api/v1/bookings`
///
/// 201 on success; 409 when someone else just took the slot (re-fetch
/// availability); 503 when the store is down (retry later).
pub async fn create_booking(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = ctx
        .booking_service
        .create_booking(
            &request.staff_id,
            &request.service_id,
            &request.client_id,
            request.start,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// `GET /api/v1/bookings/{booking_id}`
///
/// The re-query path after a commit timeout: callers check the outcome by
/// identifier instead of retrying blindly.
pub async fn get_booking(
    State(ctx): State<Arc<AppContext>>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    let booking = ctx.booking_service.find_booking(&booking_id).await?;
    Ok(Json(booking))
}

/// `DELETE /api/v1/bookings/{booking_id}`
///
/// Idempotent: cancelling an already-cancelled booking is 204 again.
pub async fn cancel_booking(
    State(ctx): State<Arc<AppContext>>,
    Path(booking_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.booking_service.cancel_booking(&booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
