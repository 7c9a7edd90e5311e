//! Sharehost infrastructure: tracing setup and the Discord notifier.

pub mod notify;
pub mod telemetry;

pub use notify::{notifier_from_config, DiscordNotifier};
pub use telemetry::init_telemetry;
