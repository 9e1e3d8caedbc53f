//! Google Calendar account linking endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, Json};
use serde::{Deserialize, Serialize};
use slotwise_core::CatalogRepository;
use slotwise_domain::SlotwiseError;
use tracing::info;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    pub staff_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub authorization_url: String,
}

/// `GET /api/v1/auth/google/start?staff_id`
///
/// Returns the authorization URL the staff member opens in a browser.
pub async fn google_start(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<StartQuery>,
) -> Result<Json<StartResponse>, ApiError> {
    ensure_linking_configured(&ctx)?;

    // Only roster members can link an account
    ctx.catalog
        .find_staff(&query.staff_id)
        .await?
        .ok_or_else(|| SlotwiseError::NotFound(format!("staff {}", query.staff_id)))?;

    let authorization_url = ctx.auth_flow.start_login(&query.staff_id)?;
    Ok(Json(StartResponse { authorization_url }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

/// `GET /api/v1/auth/google/callback?code&state`
///
/// Exchanges the authorization code for tokens and persists them for the
/// staff account the state was issued for.
pub async fn google_callback(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<&'static str>, ApiError> {
    ensure_linking_configured(&ctx)?;

    let (staff_id, tokens) = ctx.auth_flow.complete_login(&query.code, &query.state).await?;
    ctx.tokens.upsert(
        &staff_id,
        &tokens.refresh_token,
        Some(&tokens.access_token),
        Some(tokens.expires_at),
    )?;

    info!(staff_id, "calendar account linked");

    Ok(Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Calendar Linked</title></head>
<body><h1>Calendar Linked</h1><p>You can close this window.</p></body>
</html>"#,
    ))
}

fn ensure_linking_configured(ctx: &AppContext) -> Result<(), ApiError> {
    if ctx.config.calendar.client_id.is_none() {
        return Err(ApiError(SlotwiseError::Config(
            "calendar linking is not configured".into(),
        )));
    }
    Ok(())
}
