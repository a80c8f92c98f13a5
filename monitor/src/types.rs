use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One point-in-time reading of the monitored pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Total value locked (quote currency, e.g. USD).
    pub tvl: f64,
    /// Pool price ratio (reserve1 / reserve0).
    pub ratio: f64,
    pub observed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(tvl: f64, ratio: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            tvl,
            ratio,
            observed_at,
        }
    }

    pub fn now(tvl: f64, ratio: f64) -> Self {
        Self::new(tvl, ratio, Utc::now())
    }
}

/// Reference reading that every later delta is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub tvl: f64,
    pub ratio: f64,
}

impl From<&Snapshot> for Baseline {
    fn from(s: &Snapshot) -> Self {
        Self {
            tvl: s.tvl,
            ratio: s.ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Tvl,
    Ratio,
}

impl Metric {
    /// Evaluation order.
    pub const ALL: [Metric; 2] = [Metric::Tvl, Metric::Ratio];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Tvl => "TVL",
            Metric::Ratio => "Ratio",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(ConfigError::BandSyntax(format!("unknown severity `{other}`"))),
        }
    }
}

/// Percentage change of one field against the baseline.
///
/// `Undefined` marks a zero baseline field; it is never NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaPct {
    Value(f64),
    Undefined,
}

impl DeltaPct {
    pub fn between(baseline: f64, current: f64) -> Self {
        if baseline == 0.0 {
            return DeltaPct::Undefined;
        }
        let pct = (current - baseline) / baseline * 100.0;
        if pct.is_finite() {
            DeltaPct::Value(pct)
        } else {
            DeltaPct::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            DeltaPct::Value(v) => Some(v),
            DeltaPct::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, DeltaPct::Undefined)
    }
}

impl fmt::Display for DeltaPct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaPct::Value(v) => write!(f, "{v:+.2}%"),
            DeltaPct::Undefined => f.write_str("undefined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub tvl_pct: DeltaPct,
    pub ratio_pct: DeltaPct,
}

impl Delta {
    pub fn get(&self, metric: Metric) -> DeltaPct {
        match metric {
            Metric::Tvl => self.tvl_pct,
            Metric::Ratio => self.ratio_pct,
        }
    }
}

/// A single threshold crossing, consumed once by the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub severity: Severity,
    pub metric: Metric,
    pub delta_pct: f64,
    pub message: String,
    pub observed_at: DateTime<Utc>,
}
