//! Operator notifications

mod discord;

use std::sync::Arc;

use sharehost_core::{NoOpNotifier, Notifier, NotifierConfig};

pub use discord::DiscordNotifier;

/// Discord when a webhook URL is configured, otherwise a no-op.
pub fn notifier_from_config(config: &NotifierConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) => {
            tracing::info!(name = %config.webhook_name, "Discord notifications enabled");
            Ok(Arc::new(DiscordNotifier::new(url.clone(), config)?))
        }
        None => {
            tracing::info!("No webhook configured, notifications disabled");
            Ok(Arc::new(NoOpNotifier))
        }
    }
}
