//! OAuth2 authorization flow for Google Calendar accounts.
//!
//! PKCE-based: the authorization URL carries a code challenge, and the
//! callback handler exchanges the authorization code (plus the verifier)
//! for tokens. Pending logins are tracked per state value so concurrent
//! link attempts by different staff members cannot cross.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration as StdDuration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use slotwise_domain::{Result, SlotwiseError};
use tracing::debug;
use url::Url;

use super::types::{TokenExchange, TokenRefresh};
use crate::errors::InfraError;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

// Pending logins older than this are dropped
const PENDING_LOGIN_TTL: StdDuration = StdDuration::from_secs(600);

struct PendingLogin {
    staff_id: String,
    verifier: String,
    created_at: Instant,
}

/// OAuth flow manager for linking staff calendar accounts.
pub struct GoogleAuthFlow {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
    authorization_endpoint: String,
    token_endpoint: String,
    scopes: Vec<String>,
    http: Client,
    pending: Mutex<HashMap<String, PendingLogin>>,
}

impl GoogleAuthFlow {
    /// Create a flow with Google's production endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            authorization_endpoint: GOOGLE_AUTH_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            scopes: vec![GOOGLE_CALENDAR_SCOPE.to_string()],
            http: Client::new(),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Point the flow at different endpoints (tests).
    pub fn with_endpoints(
        mut self,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
    ) -> Self {
        self.authorization_endpoint = authorization_endpoint.into();
        self.token_endpoint = token_endpoint.into();
        self
    }

    /// Begin a login for a staff member; returns the authorization URL to
    /// open in the user's browser.
    pub fn start_login(&self, staff_id: &str) -> Result<String> {
        let state = random_token(32);
        let verifier = random_token(64);
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));

        let mut url = Url::parse(&self.authorization_endpoint)
            .map_err(|e| SlotwiseError::Config(format!("invalid OAuth endpoint URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", &state)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        let mut pending = lock_pending(&self.pending)?;
        pending.retain(|_, login| login.created_at.elapsed() < PENDING_LOGIN_TTL);
        pending.insert(
            state,
            PendingLogin {
                staff_id: staff_id.to_string(),
                verifier,
                created_at: Instant::now(),
            },
        );

        debug!(staff_id, "login started");
        Ok(url.to_string())
    }

    /// Exchange the authorization code for tokens.
    ///
    /// Returns the staff id the state was issued for together with the
    /// token set; the caller persists them.
    pub async fn complete_login(&self, code: &str, state: &str) -> Result<(String, TokenExchange)> {
        let login = lock_pending(&self.pending)?.remove(state).ok_or_else(|| {
            SlotwiseError::InvalidInput("unknown or expired OAuth state".into())
        })?;

        let mut form = vec![
            ("code", code.to_string()),
            ("client_id", self.client_id.clone()),
            ("redirect_uri", self.redirect_uri.clone()),
            ("grant_type", "authorization_code".to_string()),
            ("code_verifier", login.verifier.clone()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(SlotwiseError::AuthExpired(format!(
                "code exchange failed ({status}): {body}"
            )));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            SlotwiseError::AuthExpired(format!("failed to parse token response: {e}"))
        })?;

        let refresh_token = tokens.refresh_token.ok_or_else(|| {
            SlotwiseError::AuthExpired("provider issued no refresh token".into())
        })?;

        debug!(staff_id = %login.staff_id, "login completed");
        Ok((
            login.staff_id,
            TokenExchange {
                access_token: tokens.access_token,
                refresh_token,
                expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
            },
        ))
    }

    /// Obtain a fresh access token from a stored refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRefresh> {
        let mut form = vec![
            ("client_id", self.client_id.clone()),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];
        if let Some(secret) = &self.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(SlotwiseError::AuthExpired(format!(
                "token refresh failed ({status}): {body}"
            )));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            SlotwiseError::AuthExpired(format!("failed to parse refresh response: {e}"))
        })?;

        Ok(TokenRefresh {
            access_token: tokens.access_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        })
    }
}

fn lock_pending<'a>(
    pending: &'a Mutex<HashMap<String, PendingLogin>>,
) -> Result<std::sync::MutexGuard<'a, HashMap<String, PendingLogin>>> {
    pending
        .lock()
        .map_err(|_| SlotwiseError::Internal("OAuth pending-login state poisoned".into()))
}

fn random_token(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}
