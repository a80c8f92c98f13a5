use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::types::AlertEvent;

/// Outbound channel for alerts and operational diagnostics.
///
/// Retries, if any, belong to the implementation. The monitor calls each
/// method at most once per event per cycle.
#[async_trait]
pub trait AlertSink: Send + Sync + 'static {
    async fn deliver(&self, event: &AlertEvent) -> Result<(), DeliveryError>;

    /// Non-threshold messages, e.g. "source unavailable".
    async fn deliver_diagnostic(&self, message: &str) -> Result<(), DeliveryError>;

    fn name(&self) -> &str;
}

#[async_trait]
impl<T: AlertSink + ?Sized> AlertSink for Arc<T> {
    async fn deliver(&self, event: &AlertEvent) -> Result<(), DeliveryError> {
        (**self).deliver(event).await
    }

    async fn deliver_diagnostic(&self, message: &str) -> Result<(), DeliveryError> {
        (**self).deliver_diagnostic(message).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
