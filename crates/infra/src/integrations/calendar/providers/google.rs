//! Google Calendar provider implementation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use slotwise_domain::{Result, SlotwiseError, TimeRange};
use tracing::debug;

use super::traits::{BusyPeriod, CalendarApi, EventPayload};
use crate::errors::InfraError;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

// Calendar calls carry their own timeout, independent of the booking
// commit; a hung push must never hold a request open indefinitely.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Google Calendar provider
pub struct GoogleCalendarApi {
    http: Client,
    base_url: String,
}

impl Default for GoogleCalendarApi {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleCalendarApi {
    pub fn new() -> Self {
        Self { http: Client::new(), base_url: GOOGLE_CALENDAR_API_BASE.to_string() }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn status_error(status: StatusCode, body: String) -> SlotwiseError {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            SlotwiseError::AuthExpired(format!("Google API rejected credentials ({status})"))
        } else {
            SlotwiseError::Unreachable(format!("Google API error ({status}): {body}"))
        }
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarApi {
    async fn query_busy(
        &self,
        access_token: &str,
        calendar_id: &str,
        range: TimeRange,
    ) -> Result<Vec<BusyPeriod>> {
        let url = format!("{}/freeBusy", self.base_url);
        let request = FreeBusyRequest {
            time_min: range.start,
            time_max: range.end,
            items: vec![FreeBusyItem { id: calendar_id.to_string() }],
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(Self::status_error(status, body));
        }

        let parsed: FreeBusyResponse = response.json().await.map_err(|e| {
            SlotwiseError::Unreachable(format!("failed to parse free/busy response: {e}"))
        })?;

        let calendar = parsed.calendars.get(calendar_id).ok_or_else(|| {
            SlotwiseError::Unreachable(format!(
                "free/busy response missing calendar '{calendar_id}'"
            ))
        })?;

        if let Some(errors) = &calendar.errors {
            if !errors.is_empty() {
                return Err(SlotwiseError::Unreachable(format!(
                    "free/busy lookup failed: {}",
                    errors
                        .iter()
                        .map(|e| e.reason.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }

        debug!(calendar_id, busy = calendar.busy.len(), "free/busy fetched");

        Ok(calendar
            .busy
            .iter()
            .map(|window| BusyPeriod { start: window.start, end: window.end })
            .collect())
    }

    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &EventPayload,
    ) -> Result<String> {
        let url = format!("{}/calendars/{}/events", self.base_url, calendar_id);
        let body = GoogleEventBody {
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: GoogleEventTime { date_time: event.window.start, time_zone: "UTC".into() },
            end: GoogleEventTime { date_time: event.window.end, time_zone: "UTC".into() },
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(Self::status_error(status, text));
        }

        let created: GoogleEventCreated = response.json().await.map_err(|e| {
            SlotwiseError::Unreachable(format!("failed to parse event response: {e}"))
        })?;

        debug!(calendar_id, event_ref = %created.id, "event inserted");
        Ok(created.id)
    }

    async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_ref: &str,
    ) -> Result<()> {
        let url = format!("{}/calendars/{}/events/{}", self.base_url, calendar_id, event_ref);

        let response = self
            .http
            .delete(&url)
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        // Already-deleted events are a success for retraction purposes
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!(calendar_id, event_ref, "event already gone");
            return Ok(());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(Self::status_error(status, text));
        }

        debug!(calendar_id, event_ref, "event deleted");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct FreeBusyRequest {
    #[serde(rename = "timeMin")]
    time_min: DateTime<Utc>,
    #[serde(rename = "timeMax")]
    time_max: DateTime<Utc>,
    items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
struct FreeBusyItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<FreeBusyWindow>,
    errors: Option<Vec<FreeBusyError>>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyError {
    reason: String,
}

#[derive(Debug, Serialize)]
struct GoogleEventBody {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Debug, Serialize)]
struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    date_time: DateTime<Utc>,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Debug, Deserialize)]
struct GoogleEventCreated {
    id: String,
}
