use async_trait::async_trait;
use futures::future::join_all;

use monitor::{AlertEvent, AlertSink, DeliveryError};

/// Delivers every message to all inner sinks concurrently.
///
/// Succeeds only if every inner sink succeeds; otherwise the failures are
/// folded into one [`DeliveryError::Failed`]. Sinks that succeeded are not
/// rolled back.
pub struct FanoutSink {
    sinks: Vec<Box<dyn AlertSink>>,
    name: String,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn AlertSink>>) -> Self {
        let name = sinks
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join("+");
        Self { sinks, name }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn collect(&self, results: Vec<Result<(), DeliveryError>>) -> Result<(), DeliveryError> {
        let failures: Vec<String> = self
            .sinks
            .iter()
            .zip(results)
            .filter_map(|(sink, r)| r.err().map(|e| format!("{}: {e}", sink.name())))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DeliveryError::Failed(failures.join("; ")))
        }
    }
}

#[async_trait]
impl AlertSink for FanoutSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<(), DeliveryError> {
        let results = join_all(self.sinks.iter().map(|s| s.deliver(event))).await;
        self.collect(results)
    }

    async fn deliver_diagnostic(&self, message: &str) -> Result<(), DeliveryError> {
        let results = join_all(self.sinks.iter().map(|s| s.deliver_diagnostic(message))).await;
        self.collect(results)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
