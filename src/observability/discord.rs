use super::notifier::{Alert, AlertSink};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use url::Url;

const DISCORD_CONTENT_LIMIT: usize = 2000;

pub(crate) struct DiscordAlertSink {
    webhook_url: Url,
    client: Client,
}

impl DiscordAlertSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

pub(crate) fn format_alert(alert: &Alert) -> String {
    let mut lines = vec![format!(
        "**{}** `{}` `{}`",
        alert.service_name,
        alert.environment,
        alert.level.as_str()
    )];

    lines.push(format!(
        "`{}` `{}`{}",
        alert.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        alert.target,
        alert
            .location
            .as_ref()
            .map(|location| format!(" `{location}`"))
            .unwrap_or_default()
    ));

    if let Some(message) = alert.message.as_ref().filter(|m| !m.trim().is_empty()) {
        lines.push(format!("> {}", message.trim()));
    }

    for (key, value) in &alert.fields {
        lines.push(format!("- `{key}` = `{value}`"));
    }

    truncate(lines.join("\n"))
}

fn truncate(content: String) -> String {
    const SUFFIX: &str = "\n… (truncated)";

    if content.chars().count() <= DISCORD_CONTENT_LIMIT {
        return content;
    }

    let allowed = DISCORD_CONTENT_LIMIT - SUFFIX.chars().count();
    let mut truncated: String = content.chars().take(allowed).collect();
    truncated.push_str(SUFFIX);
    truncated
}

#[async_trait]
impl AlertSink for DiscordAlertSink {
    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "content": format_alert(alert) }))
            .send()
            .await
            // reqwest errors carry the URL, which embeds the webhook token.
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow!("discord webhook request timed out")
                } else {
                    anyhow!("discord webhook request failed")
                }
            })?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "discord webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tracing::Level;

    fn alert(message: &str) -> Alert {
        Alert {
            level: Level::ERROR,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap(),
            service_name: "amali-entitlements".to_string(),
            environment: "production".to_string(),
            target: "amali_entitlements::payments".to_string(),
            location: Some("src/application/usercases/payments.rs:120".to_string()),
            message: Some(message.to_string()),
            fields: BTreeMap::from([("payment_id".to_string(), "p-1".to_string())]),
        }
    }

    #[test]
    fn alert_is_formatted_for_discord() {
        let content = format_alert(&alert("payments: gateway unreachable"));

        assert!(content.starts_with("**amali-entitlements** `production` `ERROR`"));
        assert!(content.contains("`2025-06-10T12:00:00Z`"));
        assert!(content.contains("> payments: gateway unreachable"));
        assert!(content.contains("- `payment_id` = `p-1`"));
    }

    #[test]
    fn long_alerts_are_truncated() {
        let content = format_alert(&alert(&"x".repeat(5000)));

        assert_eq!(content.chars().count(), DISCORD_CONTENT_LIMIT);
        assert!(content.ends_with("(truncated)"));
    }
}
