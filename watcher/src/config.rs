use std::time::Duration;

use anyhow::{Context, Result, bail};
use monitor::{ConfigError, MonitorConfig, SeverityBands, Thresholds};

use adapters::stonfi::client::DEFAULT_BASE_URL;

#[derive(Clone, Debug, PartialEq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // Monitor configuration
    // =========================
    /// Time between pool checks (`CHECK_INTERVAL`, milliseconds).
    pub poll_interval: Duration,

    /// Upper bound for one fetch or one delivery (`IO_TIMEOUT_MS`).
    ///
    /// `None` means the smaller of 10s and half the poll interval. An explicit
    /// value that is not below the interval is rejected rather than clamped.
    pub io_timeout: Option<Duration>,

    /// Alert thresholds in percent.
    ///
    /// `ALERT_THRESHOLD` sets both metrics; `TVL_ALERT_THRESHOLD` and
    /// `RATIO_ALERT_THRESHOLD` override one metric, `off` disables it.
    pub thresholds: Thresholds,

    /// `SEVERITY_BANDS`, e.g. `1:medium,2:high,4:critical`.
    pub severity_bands: SeverityBands,

    /// `ALERT_COOLDOWN_MS`. Unset means every cycle beyond threshold alerts.
    pub alert_cooldown: Option<Duration>,

    // =========================
    // Pool
    // =========================
    /// STON.fi API root (`STONFI_API_URL`).
    pub stonfi_api_url: String,

    /// Pool contract address (`POOL_ADDRESS`). Required for the STON.fi source.
    pub pool_address: Option<String>,

    /// Human name for logs and messages (`POOL_LABEL`).
    pub pool_label: String,

    // =========================
    // Delivery
    // =========================
    /// `TELEGRAM_BOT_TOKEN` + `TELEGRAM_CHAT_ID`; `None` unless both are set.
    pub telegram: Option<TelegramCredentials>,

    /// JSON logs when `APP_ENV=production`.
    pub json_logs: bool,
}

const DEFAULT_CHECK_INTERVAL_MS: u64 = 60_000;
const DEFAULT_ALERT_THRESHOLD: f64 = 5.0;
const MAX_DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let interval_ms = parse_or(get("CHECK_INTERVAL"), "CHECK_INTERVAL", DEFAULT_CHECK_INTERVAL_MS)?;
        let poll_interval = Duration::from_millis(interval_ms);

        let io_timeout = get("IO_TIMEOUT_MS")
            .map(|raw| parse::<u64>("IO_TIMEOUT_MS", &raw))
            .transpose()?
            .map(Duration::from_millis);

        let base = parse_or(get("ALERT_THRESHOLD"), "ALERT_THRESHOLD", DEFAULT_ALERT_THRESHOLD)?;
        let thresholds = Thresholds {
            tvl_pct: threshold_override(get("TVL_ALERT_THRESHOLD"), "TVL_ALERT_THRESHOLD", base)?,
            ratio_pct: threshold_override(get("RATIO_ALERT_THRESHOLD"), "RATIO_ALERT_THRESHOLD", base)?,
        };

        let severity_bands = match get("SEVERITY_BANDS") {
            Some(raw) => raw
                .parse::<SeverityBands>()
                .with_context(|| format!("invalid SEVERITY_BANDS `{raw}`"))?,
            None => SeverityBands::default(),
        };

        let alert_cooldown = get("ALERT_COOLDOWN_MS")
            .map(|raw| parse::<u64>("ALERT_COOLDOWN_MS", &raw))
            .transpose()?
            .map(Duration::from_millis);

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramCredentials { bot_token, chat_id }),
            (None, None) => None,
            (Some(_), None) => bail!("TELEGRAM_BOT_TOKEN is set but TELEGRAM_CHAT_ID is not"),
            (None, Some(_)) => bail!("TELEGRAM_CHAT_ID is set but TELEGRAM_BOT_TOKEN is not"),
        };

        Ok(Self {
            poll_interval,
            io_timeout,
            thresholds,
            severity_bands,
            alert_cooldown,
            stonfi_api_url: get("STONFI_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            pool_address: get("POOL_ADDRESS"),
            pool_label: get("POOL_LABEL").unwrap_or_else(|| "STON.fi pool".to_string()),
            telegram,
            json_logs: get("APP_ENV").as_deref() == Some("production"),
        })
    }

    pub fn effective_io_timeout(&self) -> Duration {
        self.io_timeout
            .unwrap_or_else(|| default_io_timeout(self.poll_interval))
    }

    /// Validated monitor settings.
    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        MonitorConfig::new(
            self.pool_label.clone(),
            self.poll_interval,
            self.effective_io_timeout(),
            self.thresholds,
            self.severity_bands.clone(),
            self.alert_cooldown,
        )
    }
}

pub fn default_io_timeout(poll_interval: Duration) -> Duration {
    (poll_interval / 2).min(MAX_DEFAULT_IO_TIMEOUT)
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("invalid {key} `{raw}`"))
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}

fn threshold_override(raw: Option<String>, key: &str, base: f64) -> Result<Option<f64>> {
    match raw.as_deref() {
        None => Ok(Some(base)),
        Some(v) if v.eq_ignore_ascii_case("off") => Ok(None),
        Some(v) => parse(key, v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.poll_interval, Duration::from_secs(60));
        assert_eq!(c.effective_io_timeout(), Duration::from_secs(10));
        assert_eq!(c.thresholds, Thresholds::uniform(5.0));
        assert_eq!(c.severity_bands, SeverityBands::default());
        assert!(c.alert_cooldown.is_none());
        assert!(c.telegram.is_none());
        assert!(!c.json_logs);
        assert!(c.monitor_config().is_ok());
    }

    #[test]
    fn short_interval_shrinks_default_timeout() {
        let c = cfg(&[("CHECK_INTERVAL", "4000")]).unwrap();
        assert_eq!(c.effective_io_timeout(), Duration::from_secs(2));
        assert!(c.monitor_config().is_ok());
    }

    #[test]
    fn explicit_timeout_above_interval_fails_validation() {
        let c = cfg(&[("CHECK_INTERVAL", "1000"), ("IO_TIMEOUT_MS", "5000")]).unwrap();
        assert!(matches!(
            c.monitor_config(),
            Err(ConfigError::TimeoutNotBelowInterval { .. })
        ));
    }

    #[test]
    fn per_metric_overrides() {
        let c = cfg(&[
            ("ALERT_THRESHOLD", "3"),
            ("RATIO_ALERT_THRESHOLD", "off"),
        ])
        .unwrap();
        assert_eq!(c.thresholds.tvl_pct, Some(3.0));
        assert_eq!(c.thresholds.ratio_pct, None);

        let c = cfg(&[("TVL_ALERT_THRESHOLD", "OFF"), ("RATIO_ALERT_THRESHOLD", "off")]).unwrap();
        assert_eq!(c.monitor_config().unwrap_err(), ConfigError::NoThresholds);
    }

    #[test]
    fn malformed_values_are_reported_with_the_key() {
        let err = cfg(&[("CHECK_INTERVAL", "soon")]).unwrap_err();
        assert!(err.to_string().contains("CHECK_INTERVAL"), "{err}");

        let err = cfg(&[("SEVERITY_BANDS", "1:medium,0.5:high")]).unwrap_err();
        assert!(err.to_string().contains("SEVERITY_BANDS"), "{err}");
    }

    #[test]
    fn telegram_needs_both_halves() {
        assert!(cfg(&[("TELEGRAM_BOT_TOKEN", "t")]).is_err());
        assert!(cfg(&[("TELEGRAM_CHAT_ID", "1")]).is_err());

        let c = cfg(&[("TELEGRAM_BOT_TOKEN", "t"), ("TELEGRAM_CHAT_ID", "1")]).unwrap();
        assert_eq!(
            c.telegram,
            Some(TelegramCredentials {
                bot_token: "t".into(),
                chat_id: "1".into()
            })
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let c = cfg(&[("POOL_ADDRESS", "  "), ("ALERT_COOLDOWN_MS", "")]).unwrap();
        assert!(c.pool_address.is_none());
        assert!(c.alert_cooldown.is_none());
    }

    #[test]
    fn production_env_switches_to_json_logs() {
        assert!(cfg(&[("APP_ENV", "production")]).unwrap().json_logs);
    }

    #[test]
    fn default_timeout_follows_interval_changes() {
        let mut c = cfg(&[]).unwrap();
        c.poll_interval = Duration::from_secs(2);
        assert_eq!(c.effective_io_timeout(), Duration::from_secs(1));
        assert!(c.monitor_config().is_ok());
    }
}
