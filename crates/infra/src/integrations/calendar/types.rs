//! Shared types for the calendar integration.

use chrono::{DateTime, Utc};

/// Tokens returned by the authorization-code exchange.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access token returned by a refresh-token grant.
#[derive(Debug, Clone)]
pub struct TokenRefresh {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}
