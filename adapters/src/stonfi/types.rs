use chrono::{DateTime, Utc};
use monitor::Snapshot;
use serde::Deserialize;

use crate::stonfi::errors::StonfiError;

#[derive(Debug, Deserialize)]
pub struct PoolEnvelope {
    pub pool: Pool,
}

/// Subset of the STON.fi `/pools/{address}` payload the monitor reads.
/// Numeric fields arrive as decimal strings.
#[derive(Debug, Deserialize)]
pub struct Pool {
    pub address: String,

    pub reserve0: String,
    pub reserve1: String,

    #[serde(default)]
    pub lp_total_supply_usd: Option<String>,

    #[serde(default)]
    pub deprecated: bool,
}

impl Pool {
    /// Converts the raw pool into a monitor reading.
    ///
    /// - `tvl`   = `lp_total_supply_usd`
    /// - `ratio` = `reserve1 / reserve0` in raw units (decimals cancel out of
    ///   percentage deltas). An empty `reserve0` has no ratio and is an error.
    pub fn to_snapshot(&self, observed_at: DateTime<Utc>) -> Result<Snapshot, StonfiError> {
        let reserve0 = parse_reserve("reserve0", &self.reserve0)?;
        let reserve1 = parse_reserve("reserve1", &self.reserve1)?;

        let tvl_raw = self
            .lp_total_supply_usd
            .as_deref()
            .ok_or(StonfiError::MissingField("lp_total_supply_usd"))?;
        let tvl: f64 = tvl_raw
            .trim()
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| StonfiError::InvalidField {
                field: "lp_total_supply_usd",
                value: tvl_raw.to_string(),
            })?;

        if reserve0 == 0 {
            return Err(StonfiError::InvalidField {
                field: "reserve0",
                value: self.reserve0.clone(),
            });
        }
        let ratio = reserve1 as f64 / reserve0 as f64;

        Ok(Snapshot::new(tvl, ratio, observed_at))
    }
}

fn parse_reserve(field: &'static str, raw: &str) -> Result<u128, StonfiError> {
    raw.trim().parse().map_err(|_| StonfiError::InvalidField {
        field,
        value: raw.to_string(),
    })
}
