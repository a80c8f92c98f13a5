use async_trait::async_trait;
use tracing::{error, warn};

use monitor::{AlertEvent, AlertSink, DeliveryError};

/// Writes alerts and diagnostics to the tracing pipeline. Never fails.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<(), DeliveryError> {
        warn!(
            target: "alerts",
            severity = %event.severity,
            metric = %event.metric,
            delta_pct = event.delta_pct,
            observed_at = %event.observed_at,
            "{}",
            event.message
        );
        Ok(())
    }

    async fn deliver_diagnostic(&self, message: &str) -> Result<(), DeliveryError> {
        error!(target: "alerts", "{message}");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
