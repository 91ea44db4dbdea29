//! Administrator notifications for new submissions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intake_core::sanitize::strip_tags;
use intake_core::{Error, Result, SanitizedSubmission};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::{info, warn};

use crate::config::NotificationConfig;

/// Sends a notice about an accepted submission.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns whether the notice was delivered. `Err` is reserved for
    /// failures the request should surface.
    async fn notify(
        &self,
        data: &SanitizedSubmission,
        form_id: Option<&str>,
        client_ip: &str,
    ) -> Result<bool>;

    fn is_healthy(&self) -> bool {
        true
    }
}

/// Shared notifier handle.
pub type SharedNotifier = Arc<dyn Notifier>;

/// Notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationChannel {
    /// Log only
    Log,
    /// JSON POST to an endpoint
    Webhook { url: String },
}

/// Body posted to webhook channels.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload<'a> {
    pub to: &'a [String],
    pub subject: &'a str,
    pub message: &'a str,
    pub form_id: Option<&'a str>,
}

/// Delivers notices over every configured channel.
pub struct NotificationDispatcher {
    config: NotificationConfig,
    channels: Vec<NotificationChannel>,
    client: reqwest::Client,
}

impl NotificationDispatcher {
    pub fn new(config: NotificationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("notification client: {}", e)))?;

        let mut channels = vec![NotificationChannel::Log];
        if let Some(url) = &config.webhook_url {
            channels.push(NotificationChannel::Webhook { url: url.clone() });
        }

        Ok(Self {
            config,
            channels,
            client,
        })
    }

    pub fn channels(&self) -> &[NotificationChannel] {
        &self.channels
    }

    async fn send(
        &self,
        channel: &NotificationChannel,
        subject: &str,
        message: &str,
        form_id: Option<&str>,
    ) -> bool {
        match channel {
            NotificationChannel::Log => {
                info!(
                    recipients = ?self.config.recipients,
                    subject,
                    form_id,
                    "Form submission notification"
                );
                true
            }
            NotificationChannel::Webhook { url } => {
                let payload = WebhookPayload {
                    to: &self.config.recipients,
                    subject,
                    message,
                    form_id,
                };

                match self.client.post(url).json(&payload).send().await {
                    Ok(response) if response.status().is_success() => true,
                    Ok(response) => {
                        warn!(url, status = %response.status(), "Webhook rejected notification");
                        false
                    }
                    Err(e) => {
                        warn!(url, error = %e, "Failed to send webhook notification");
                        false
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    async fn notify(
        &self,
        data: &SanitizedSubmission,
        form_id: Option<&str>,
        client_ip: &str,
    ) -> Result<bool> {
        if !self.config.enabled {
            return Ok(true);
        }

        let subject = self.config.subject_line();
        let message = build_message(data, form_id, client_ip, Utc::now());

        let mut delivered = true;
        for channel in &self.channels {
            if !self.send(channel, &subject, &message, form_id).await {
                delivered = false;
            }
        }

        if delivered {
            metrics().notifications_sent.inc();
        } else {
            metrics().notifications_failed.inc();
        }

        Ok(delivered)
    }
}

/// Field id as a human label: separators become spaces, words are capitalised.
pub fn field_label(field_id: &str) -> String {
    field_id
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain-text notification body.
pub fn build_message(
    data: &SanitizedSubmission,
    form_id: Option<&str>,
    client_ip: &str,
    submitted_at: DateTime<Utc>,
) -> String {
    let mut lines = vec!["New form submission received:\n".to_string()];

    lines.extend(data.iter().map(|(field_id, value)| {
        format!("{}: {}", strip_tags(&field_label(field_id)), strip_tags(value))
    }));

    lines.push(String::new());
    lines.push(format!("Form ID: {}", strip_tags(form_id.unwrap_or_default())));
    lines.push(format!(
        "Submitted at: {}",
        submitted_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(format!("IP Address: {}", client_ip));

    lines.join("\n")
}
