use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use monitor::{MetricSource, Snapshot, SourceError};

use crate::stonfi::client::StonfiClient;

/// Reads TVL and price ratio of one STON.fi pool per fetch.
pub struct StonfiPoolSource {
    client: StonfiClient,
    pool_address: String,
}

impl StonfiPoolSource {
    pub fn new(client: StonfiClient, pool_address: impl Into<String>) -> Self {
        Self {
            client,
            pool_address: pool_address.into(),
        }
    }

    pub fn pool_address(&self) -> &str {
        &self.pool_address
    }
}

#[async_trait]
impl MetricSource for StonfiPoolSource {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let pool = self
            .client
            .fetch_pool(&self.pool_address)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(self.client.timeout().as_millis() as u64)
                } else {
                    SourceError::from(e)
                }
            })?;

        if pool.deprecated {
            warn!(pool = %pool.address, "pool is marked deprecated by ston.fi");
        }

        Ok(pool.to_snapshot(Utc::now())?)
    }

    fn name(&self) -> &str {
        "stonfi"
    }
}
