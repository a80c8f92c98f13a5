use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Metric, Severity};

/// Per-metric alert thresholds, in percent of the baseline value.
///
/// `None` disables alerting for that metric. At least one must be set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub tvl_pct: Option<f64>,
    pub ratio_pct: Option<f64>,
}

impl Thresholds {
    /// Same threshold on every metric.
    pub fn uniform(pct: f64) -> Self {
        Self {
            tvl_pct: Some(pct),
            ratio_pct: Some(pct),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Tvl => self.tvl_pct,
            Metric::Ratio => self.ratio_pct,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tvl_pct.is_none() && self.ratio_pct.is_none() {
            return Err(ConfigError::NoThresholds);
        }
        for metric in Metric::ALL {
            if let Some(value) = self.get(metric) {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidThreshold {
                        metric: metric.as_str(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Severity assigned once `|delta| / threshold` reaches `lower_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub lower_bound: f64,
    pub severity: Severity,
}

impl SeverityBand {
    pub fn new(lower_bound: f64, severity: Severity) -> Self {
        Self {
            lower_bound,
            severity,
        }
    }
}

/// Ordered severity policy.
///
/// Invariants (checked by [`SeverityBands::new`]):
/// - non-empty
/// - every bound finite and positive
/// - first bound <= 1.0, so any crossing falls inside a band
/// - bounds strictly increasing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeverityBand>")]
pub struct SeverityBands(Vec<SeverityBand>);

impl SeverityBands {
    pub fn new(bands: Vec<SeverityBand>) -> Result<Self, ConfigError> {
        let bands = Self(bands);
        bands.validate()?;
        Ok(bands)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let first = self.0.first().ok_or(ConfigError::EmptyBands)?;
        if first.lower_bound > 1.0 {
            return Err(ConfigError::FirstBandTooHigh(first.lower_bound));
        }
        for band in &self.0 {
            if !band.lower_bound.is_finite() || band.lower_bound <= 0.0 {
                return Err(ConfigError::InvalidBandBound(band.lower_bound));
            }
        }
        for pair in self.0.windows(2) {
            if pair[1].lower_bound <= pair[0].lower_bound {
                return Err(ConfigError::UnorderedBands {
                    prev: pair[0].lower_bound,
                    next: pair[1].lower_bound,
                });
            }
        }
        Ok(())
    }

    /// Severity for a delta that is `multiple` times its threshold.
    ///
    /// Picks the highest band whose lower bound is reached. Multiples below the
    /// first band (only possible for sub-threshold input) get the first band.
    /// `None` only for an empty table.
    pub fn classify(&self, multiple: f64) -> Option<Severity> {
        self.0
            .iter()
            .rev()
            .find(|b| multiple >= b.lower_bound)
            .or(self.0.first())
            .map(|b| b.severity)
    }

    pub fn bands(&self) -> &[SeverityBand] {
        &self.0
    }
}

impl TryFrom<Vec<SeverityBand>> for SeverityBands {
    type Error = ConfigError;

    fn try_from(bands: Vec<SeverityBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl Default for SeverityBands {
    /// `< 2x` medium, `2x..4x` high, `>= 4x` critical.
    fn default() -> Self {
        Self(vec![
            SeverityBand::new(1.0, Severity::Medium),
            SeverityBand::new(2.0, Severity::High),
            SeverityBand::new(4.0, Severity::Critical),
        ])
    }
}

/// Parses `"1:medium,2:high,4:critical"`.
impl FromStr for SeverityBands {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bands = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (bound, severity) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::BandSyntax(entry.to_string()))?;
            let lower_bound: f64 = bound
                .trim()
                .parse()
                .map_err(|_| ConfigError::BandSyntax(entry.to_string()))?;
            bands.push(SeverityBand::new(lower_bound, severity.parse()?));
        }
        Self::new(bands)
    }
}

#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Name used in spans and log lines; lets several monitors share a process.
    pub(crate) label: String,

    /// Time between cycle starts. The first cycle runs immediately.
    pub(crate) poll_interval: Duration,

    /// Upper bound for a single fetch or delivery.
    ///
    /// Must be shorter than `poll_interval` so a hung call can never hold the
    /// loop across more than one tick.
    pub(crate) io_timeout: Duration,

    pub(crate) thresholds: Thresholds,

    pub(crate) severity_bands: SeverityBands,

    /// Opt-in suppression of repeated alerts for the same metric.
    ///
    /// `None` re-alerts on every cycle a metric stays beyond its threshold.
    pub(crate) alert_cooldown: Option<Duration>,
}

impl MonitorConfig {
    pub fn new(
        label: impl Into<String>,
        poll_interval: Duration,
        io_timeout: Duration,
        thresholds: Thresholds,
        severity_bands: SeverityBands,
        alert_cooldown: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            label: label.into(),
            poll_interval,
            io_timeout,
            thresholds,
            severity_bands,
            alert_cooldown,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn severity_bands(&self) -> &SeverityBands {
        &self.severity_bands
    }

    pub fn alert_cooldown(&self) -> Option<Duration> {
        self.alert_cooldown
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.io_timeout.is_zero() || self.io_timeout >= self.poll_interval {
            return Err(ConfigError::TimeoutNotBelowInterval {
                timeout_ms: self.io_timeout.as_millis() as u64,
                interval_ms: self.poll_interval.as_millis() as u64,
            });
        }
        self.thresholds.validate()?;
        self.severity_bands.validate()?;
        if matches!(self.alert_cooldown, Some(d) if d.is_zero()) {
            return Err(ConfigError::ZeroCooldown);
        }
        Ok(())
    }
}
