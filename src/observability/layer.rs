use super::config::ServiceLabels;
use super::notifier::{Alert, AlertQueue};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Forwards events at or above `min_level` to the alert queue.
pub(crate) struct AlertLayer {
    queue: AlertQueue,
    labels: ServiceLabels,
    min_level: Level,
}

impl AlertLayer {
    pub(crate) fn new(queue: AlertQueue, labels: ServiceLabels, min_level: Level) -> Self {
        Self {
            queue,
            labels,
            min_level,
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    values: BTreeMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        self.values
            .insert(field.name().to_string(), redact(field.name(), value));
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // tracing orders levels by verbosity: ERROR is the smallest.
        if *metadata.level() > self.min_level || is_own_event(metadata.target()) {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let message = collector
            .values
            .remove("message")
            .map(|raw| unquote(&raw));

        self.queue.push(Alert {
            level: *metadata.level(),
            timestamp: Utc::now(),
            service_name: self.labels.service_name.clone(),
            environment: self.labels.environment.clone(),
            target: metadata.target().to_string(),
            location: metadata
                .file()
                .zip(metadata.line())
                .map(|(file, line)| format!("{file}:{line}")),
            message,
            fields: collector.values,
        });
    }
}

/// Queue and sink failures are logged at WARN; alerting on them would feed the queue itself.
fn is_own_event(target: &str) -> bool {
    target.starts_with(concat!(env!("CARGO_CRATE_NAME"), "::observability"))
}

fn unquote(input: &str) -> String {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

pub(crate) fn redact(field_name: &str, value: String) -> String {
    let field = field_name.to_ascii_lowercase();
    let sensitive = ["secret", "password", "token", "authorization", "webhook", "signature", "merchant_key", "api_key"]
        .iter()
        .any(|marker| field.contains(marker));

    if sensitive { "[REDACTED]".to_string() } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_fields_are_redacted() {
        assert_eq!(redact("webhook_secret", "whsec".into()), "[REDACTED]");
        assert_eq!(redact("X_Signature", "abcd".into()), "[REDACTED]");
        assert_eq!(redact("merchant_key", "mk".into()), "[REDACTED]");
        assert_eq!(redact("user_id", "42".into()), "42");
    }

    #[test]
    fn alert_plumbing_events_are_skipped() {
        assert!(is_own_event(module_path!()));
        assert!(!is_own_event("amali_entitlements::application::usercases::payments"));
    }

    #[test]
    fn debug_quotes_are_stripped() {
        assert_eq!(unquote("\"payments: failed\""), "payments: failed");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
    }
}
