use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use sharehost_core::{Notification, Notifier, NotifierConfig, Severity};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
}

/// Posts notifications as embeds to a Discord webhook.
///
/// Each notification is sent from its own task, so `notify` returns without
/// waiting on the network. Delivery failures are only logged.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: reqwest::Client,
    url: String,
    username: String,
    success_color: u32,
    error_color: u32,
}

impl DiscordNotifier {
    pub fn new(url: impl Into<String>, config: &NotifierConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create webhook HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            username: config.webhook_name.clone(),
            success_color: config.success_color,
            error_color: config.error_color,
        })
    }

    fn color_for(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Success => self.success_color,
            Severity::Error => self.error_color,
        }
    }

    fn payload(&self, notification: &Notification) -> serde_json::Value {
        let payload = WebhookPayload {
            username: &self.username,
            embeds: [Embed {
                title: &notification.title,
                description: &notification.description,
                color: self.color_for(notification.severity),
            }],
        };
        serde_json::to_value(payload).unwrap_or_default()
    }

    async fn send(&self, body: serde_json::Value, title: String) {
        match self.client.post(&self.url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(title = %title, "Webhook delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    title = %title,
                    status = response.status().as_u16(),
                    "Webhook rejected notification"
                );
            }
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "Webhook delivery failed");
            }
        }
    }
}

impl Notifier for DiscordNotifier {
    fn notify(&self, notification: Notification) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                title = %notification.title,
                "No async runtime available, notification dropped"
            );
            return;
        };

        let body = self.payload(&notification);
        let notifier = self.clone();
        handle.spawn(async move {
            notifier.send(body, notification.title).await;
        });
    }
}
