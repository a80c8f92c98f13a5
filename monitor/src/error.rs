use thiserror::Error;

/// Failure to obtain a snapshot. Always transient from the loop's point of view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("source timed out after {0}ms")]
    Timeout(u64),
}

/// Failure to hand an alert or diagnostic to its channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("delivery failed: {0}")]
    Failed(String),

    #[error("delivery timed out after {0}ms")]
    Timeout(u64),
}

/// Rejected monitor configuration. Only raised at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    #[error("io timeout ({timeout_ms}ms) must be positive and shorter than the poll interval ({interval_ms}ms)")]
    TimeoutNotBelowInterval { timeout_ms: u64, interval_ms: u64 },

    #[error("no thresholds configured")]
    NoThresholds,

    #[error("threshold for {metric} must be finite and positive, got {value}")]
    InvalidThreshold { metric: &'static str, value: f64 },

    #[error("severity band table is empty")]
    EmptyBands,

    #[error("severity band lower bound must be finite and positive, got {0}")]
    InvalidBandBound(f64),

    #[error("first severity band must start at or below 1.0x threshold, got {0}")]
    FirstBandTooHigh(f64),

    #[error("severity band bounds must be strictly increasing ({prev} then {next})")]
    UnorderedBands { prev: f64, next: f64 },

    #[error("alert cooldown must be greater than zero when set")]
    ZeroCooldown,

    #[error("invalid severity band entry: {0}")]
    BandSyntax(String),
}
