use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::stonfi::errors::StonfiError;
use crate::stonfi::types::{Pool, PoolEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://api.ston.fi/v1";

#[derive(Clone)]
pub struct StonfiClient {
    http: Client,
    url: String,
    timeout: Duration,
}

impl StonfiClient {
    /// `timeout` bounds each request; keep it below the monitor's io timeout so
    /// the HTTP layer reports the failure first.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, StonfiError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(
        skip(self),
        fields(pool_address = %pool_address),
        level = "debug"
    )]
    pub async fn fetch_pool(&self, pool_address: &str) -> Result<Pool, StonfiError> {
        let url = format!("{}/pools/{}", self.url, pool_address);

        let resp = self.http.get(&url).send().await?.error_for_status()?;

        let envelope: PoolEnvelope = resp.json().await?;

        debug!(
            reserve0 = %envelope.pool.reserve0,
            reserve1 = %envelope.pool.reserve1,
            tvl_usd = ?envelope.pool.lp_total_supply_usd,
            "stonfi pool fetched"
        );

        Ok(envelope.pool)
    }
}
