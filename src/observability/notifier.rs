use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, warn};

const QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub(crate) struct Alert {
    pub(crate) level: Level,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) target: String,
    pub(crate) location: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) fields: BTreeMap<String, String>,
}

#[async_trait]
pub(crate) trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Bounded queue between the tracing layer and the sinks. Logging never waits on
/// the network: a full queue drops the alert.
#[derive(Clone)]
pub(crate) struct AlertQueue {
    tx: mpsc::Sender<Alert>,
}

impl AlertQueue {
    pub(crate) fn spawn(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Alert>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                for sink in &sinks {
                    if let Err(error) = sink.deliver(&alert).await {
                        warn!(sink = sink.name(), error = %error, "alert sink failed");
                    }
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn push(&self, alert: Alert) {
        match self.tx.try_send(alert) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("alert queue full; dropping alert");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("alert queue closed; dropping alert");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingSink {
        seen: Mutex<Vec<String>>,
        done: tokio::sync::Notify,
    }

    #[async_trait]
    impl AlertSink for CapturingSink {
        async fn deliver(&self, alert: &Alert) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push(alert.message.clone().unwrap_or_default());
            self.done.notify_one();
            Ok(())
        }

        fn name(&self) -> &'static str {
            "capturing"
        }
    }

    #[tokio::test]
    async fn queued_alert_reaches_sink() {
        let sink = Arc::new(CapturingSink::default());
        let queue = AlertQueue::spawn(vec![Arc::clone(&sink) as Arc<dyn AlertSink>]);

        queue.push(Alert {
            level: Level::ERROR,
            timestamp: Utc::now(),
            service_name: "svc".to_string(),
            environment: "test".to_string(),
            target: "amali".to_string(),
            location: None,
            message: Some("payments: gateway unreachable".to_string()),
            fields: BTreeMap::new(),
        });
        sink.done.notified().await;

        assert_eq!(
            sink.seen.lock().unwrap().as_slice(),
            ["payments: gateway unreachable".to_string()]
        );
    }
}
