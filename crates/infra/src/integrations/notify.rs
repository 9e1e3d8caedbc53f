//! Reminder notification delivery.
//!
//! POSTs reminder payloads to a configured webhook endpoint (the messaging
//! collaborator). Delivery retries beyond one request are the collaborator's
//! concern. Client contacts never appear in logs unredacted.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sha2::{Digest, Sha256};
use slotwise_core::NotificationSender;
use slotwise_domain::{Result, SlotwiseError};
use tracing::{debug, info};

use crate::errors::InfraError;

/// Webhook-backed notification sender.
pub struct WebhookNotifier {
    http: Client,
    endpoint: Option<String>,
}

impl WebhookNotifier {
    /// Create a notifier. With no endpoint configured, sends are logged and
    /// acknowledged without leaving the process.
    pub fn new(endpoint: Option<String>) -> Self {
        Self { http: Client::new(), endpoint }
    }
}

#[async_trait]
impl NotificationSender for WebhookNotifier {
    async fn send(&self, client_contact: &str, message: &str) -> Result<()> {
        let contact_tag = redact_contact(client_contact);

        let Some(endpoint) = &self.endpoint else {
            debug!(contact = %contact_tag, "notifier endpoint not configured; reminder logged only");
            return Ok(());
        };

        let payload = NotificationPayload { contact: client_contact, message };
        let response = self
            .http
            .post(endpoint)
            .timeout(std::time::Duration::from_secs(10))
            .json(&payload)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SlotwiseError::Network(format!(
                "notification dispatch rejected ({status})"
            )));
        }

        info!(contact = %contact_tag, "reminder notification delivered");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    contact: &'a str,
    message: &'a str,
}

fn redact_contact(contact: &str) -> String {
    const CONTACT_HASH_SALT: &[u8] = b"slotwise-notifier-contact-salt";
    let mut hasher = Sha256::new();
    hasher.update(CONTACT_HASH_SALT);
    hasher.update(contact.as_bytes());
    let digest = hasher.finalize();
    let hash = hex::encode(&digest[..8]);
    format!("contact_hash={hash}")
}
