mod config;
mod discord;
mod layer;
mod notifier;

use anyhow::Result;
use config::AlertsConfig;
use discord::DiscordAlertSink;
use layer::AlertLayer;
use notifier::AlertQueue;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Installs the global subscriber: RFC 3339 local-time fmt output filtered by
/// `RUST_LOG` (default `info`), plus optional Discord alerts for errors.
/// Must run inside the tokio runtime.
pub fn init_observability(service: &str) -> Result<()> {
    let config = AlertsConfig::from_lookup(service, |key| std::env::var(key).ok());

    let alert_layer = match config.discord.as_ref() {
        Some(discord) => {
            let sink = DiscordAlertSink::new(discord.webhook_url.clone())?;
            let queue = AlertQueue::spawn(vec![Arc::new(sink)]);
            Some(
                AlertLayer::new(queue, config.labels.clone(), discord.min_level).with_filter(
                    tracing_subscriber::filter::LevelFilter::from_level(discord.min_level),
                ),
            )
        }
        None => None,
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    for warning in &config.warnings {
        warn!(
            service = %config.labels.service_name,
            environment = %config.labels.environment,
            warning = %warning,
            "observability config warning"
        );
    }

    info!(
        service = %config.labels.service_name,
        environment = %config.labels.environment,
        discord_alerts = config.discord.is_some(),
        "observability initialized"
    );

    Ok(())
}
