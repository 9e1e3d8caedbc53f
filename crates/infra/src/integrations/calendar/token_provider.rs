//! Per-staff access token provider backed by stored refresh tokens.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use slotwise_domain::constants::TOKEN_REFRESH_SLACK_SECS;
use slotwise_domain::{Result, SlotwiseError};
use tracing::{debug, instrument};

use super::oauth::GoogleAuthFlow;
use super::providers::AccessTokenProvider;
use crate::database::SqliteTokenRepository;

/// Access token provider that refreshes through the OAuth flow and caches
/// the access token in the token repository.
pub struct GoogleTokenProvider {
    tokens: Arc<SqliteTokenRepository>,
    auth: Arc<GoogleAuthFlow>,
}

impl GoogleTokenProvider {
    /// Create a new token provider.
    pub fn new(tokens: Arc<SqliteTokenRepository>, auth: Arc<GoogleAuthFlow>) -> Self {
        Self { tokens, auth }
    }
}

#[async_trait]
impl AccessTokenProvider for GoogleTokenProvider {
    #[instrument(skip(self))]
    async fn access_token(&self, staff_id: &str) -> Result<String> {
        let stored = self.tokens.find(staff_id)?.ok_or_else(|| {
            SlotwiseError::AuthExpired(format!("calendar account not linked for staff {staff_id}"))
        })?;

        // Reuse the cached access token while it has slack left
        if let (Some(token), Some(expires_at)) =
            (&stored.access_token, stored.access_expires_at)
        {
            if expires_at - Duration::seconds(TOKEN_REFRESH_SLACK_SECS) > Utc::now() {
                return Ok(token.clone());
            }
        }

        debug!(staff_id, "access token stale; refreshing");
        let refreshed = self.auth.refresh(&stored.refresh_token).await?;
        self.tokens.update_access_token(staff_id, &refreshed.access_token, refreshed.expires_at)?;
        Ok(refreshed.access_token)
    }
}
