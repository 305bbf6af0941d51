use tracing::Level;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServiceLabels {
    pub(crate) service_name: String,
    pub(crate) environment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DiscordAlerts {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AlertsConfig {
    pub(crate) labels: ServiceLabels,
    pub(crate) discord: Option<DiscordAlerts>,
    /// Collected while parsing, logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl AlertsConfig {
    pub(crate) fn from_lookup<F>(service: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let labels = ServiceLabels {
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| service.to_string()),
            environment: non_empty("STAGE").unwrap_or_else(|| "unknown".to_string()),
        };

        let mut warnings = Vec::new();
        let enabled = non_empty("DISCORD_NOTIFY_ENABLED")
            .map(|raw| parse_bool(&raw))
            .unwrap_or(true);

        let webhook_url = match non_empty("DISCORD_WEBHOOK_URL") {
            Some(raw) if enabled => match Url::parse(raw.trim()) {
                Ok(url) => Some(url),
                Err(err) => {
                    // The raw value embeds the webhook token; never echo it.
                    warnings.push(format!(
                        "DISCORD_WEBHOOK_URL is invalid; Discord alerts disabled (parse error: {err})"
                    ));
                    None
                }
            },
            _ => None,
        };

        let discord = webhook_url.map(|webhook_url| {
            let min_level = match non_empty("DISCORD_NOTIFY_LEVEL") {
                Some(raw) => parse_level(&raw).unwrap_or_else(|| {
                    warnings.push(format!(
                        "DISCORD_NOTIFY_LEVEL is invalid (value: {raw}); defaulting to ERROR"
                    ));
                    Level::ERROR
                }),
                None => Level::ERROR,
            };
            DiscordAlerts {
                webhook_url,
                min_level,
            }
        });

        Self {
            labels,
            discord,
            warnings,
        }
    }
}

fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        _ => None,
    }
}

fn parse_bool(input: &str) -> bool {
    !matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
