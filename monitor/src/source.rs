use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::Snapshot;

/// Provider of pool readings.
///
/// Implementations must report failures as [`SourceError`] and never substitute
/// a zero reading: a fabricated zero would look like a 100% drop.
#[async_trait]
pub trait MetricSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Snapshot, SourceError>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: MetricSource + ?Sized> MetricSource for Arc<T> {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        (**self).fetch().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
