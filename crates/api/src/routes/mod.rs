//! HTTP routes for the scheduling core's callable surface.

pub mod auth;
pub mod availability;
pub mod bookings;

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/staff/{staff_id}/slots", get(availability::get_available_slots))
        .route("/api/v1/bookings", post(bookings::create_booking))
        .route(
            "/api/v1/bookings/{booking_id}",
            get(bookings::get_booking).delete(bookings::cancel_booking),
        )
        .route("/api/v1/auth/google/start", get(auth::google_start))
        .route("/api/v1/auth/google/callback", get(auth::google_callback))
        .with_state(ctx)
}

/// Liveness probe; verifies the store answers.
async fn health(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    ctx.db.health_check()?;
    Ok(Json(json!({ "status": "ok" })))
}
