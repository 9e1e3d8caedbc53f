//! HTTP mapping of domain errors.
//!
//! `Conflict` and `InvalidRange` surface verbatim to the caller: they are
//! decision inputs ("re-fetch availability", "fix the window"), not hidden
//! failures. `StoreUnavailable` is the retry-later signal.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use slotwise_domain::SlotwiseError;

/// Error wrapper implementing axum's response conversion.
#[derive(Debug)]
pub struct ApiError(pub SlotwiseError);

impl<E> From<E> for ApiError
where
    E: Into<SlotwiseError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SlotwiseError::NotFound(_) => StatusCode::NOT_FOUND,
            SlotwiseError::InvalidRange(_) | SlotwiseError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            SlotwiseError::Conflict(_) => StatusCode::CONFLICT,
            SlotwiseError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SlotwiseError::AuthExpired(_) => StatusCode::UNAUTHORIZED,
            SlotwiseError::Unreachable(_) | SlotwiseError::Network(_) => StatusCode::BAD_GATEWAY,
            SlotwiseError::Database(_)
            | SlotwiseError::Config(_)
            | SlotwiseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self.0)).into_response()
    }
}
