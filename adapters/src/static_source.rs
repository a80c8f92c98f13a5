use async_trait::async_trait;

use monitor::{MetricSource, Snapshot, SourceError};

/// Placeholder pool readings used before a real data source is wired in.
pub const DEMO_TVL: f64 = 1_000_000.0;
pub const DEMO_RATIO: f64 = 1.02;

/// Returns the same reading on every fetch, stamped with the current time.
///
/// Useful for dry runs of the alert path without network access.
#[derive(Debug, Clone)]
pub struct StaticSource {
    tvl: f64,
    ratio: f64,
}

impl StaticSource {
    pub fn new(tvl: f64, ratio: f64) -> Self {
        Self { tvl, ratio }
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new(DEMO_TVL, DEMO_RATIO)
    }
}

#[async_trait]
impl MetricSource for StaticSource {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        Ok(Snapshot::now(self.tvl, self.ratio))
    }

    fn name(&self) -> &str {
        "static"
    }
}
