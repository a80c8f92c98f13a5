//! Wiring between configuration, adapters and the monitor loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use adapters::telegram::format;
use adapters::{
    FanoutSink, LogSink, StaticSource, StonfiClient, StonfiPoolSource, TelegramConfig,
    TelegramSink,
};
use monitor::{AlertEvent, AlertSink, Metric, MetricSource, MonitorLoop, Severity};

use crate::cli::{RunArgs, SourceKind};
use crate::config::AppConfig;

/// HTTP clients give up slightly before the monitor's own timeout, so the
/// failure carries the transport's reason instead of a bare timeout.
fn client_timeout(io_timeout: Duration) -> Duration {
    io_timeout.mul_f64(0.9)
}

pub fn build_source(cfg: &AppConfig, kind: SourceKind) -> Result<Arc<dyn MetricSource>> {
    match kind {
        SourceKind::Stonfi => {
            let Some(pool_address) = cfg.pool_address.clone() else {
                bail!("POOL_ADDRESS is required for the stonfi source");
            };
            let client = StonfiClient::new(
                cfg.stonfi_api_url.clone(),
                client_timeout(cfg.effective_io_timeout()),
            )
            .context("failed to build ston.fi client")?;
            Ok(Arc::new(StonfiPoolSource::new(client, pool_address)))
        }
        SourceKind::Static => Ok(Arc::new(StaticSource::default())),
    }
}

fn telegram_sink(cfg: &AppConfig) -> Result<Option<TelegramSink>> {
    let Some(creds) = &cfg.telegram else {
        return Ok(None);
    };
    let mut tg = TelegramConfig::new(&creds.bot_token, &creds.chat_id, &cfg.pool_label);
    tg.timeout = client_timeout(cfg.effective_io_timeout());
    Ok(Some(TelegramSink::new(tg).context("failed to build telegram sink")?))
}

/// Log sink always; Telegram too unless `dry_run` or no credentials.
pub fn build_sink(cfg: &AppConfig, dry_run: bool) -> Result<FanoutSink> {
    let mut sinks: Vec<Box<dyn AlertSink>> = vec![Box::new(LogSink)];

    if dry_run {
        info!("dry run: alerts go to the log only");
    } else if let Some(tg) = telegram_sink(cfg)? {
        sinks.push(Box::new(tg));
    } else {
        warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set; alerts go to the log only");
    }

    Ok(FanoutSink::new(sinks))
}

fn log_banner(cfg: &AppConfig, source: &str, sink: &str) {
    let bands = cfg
        .severity_bands
        .bands()
        .iter()
        .map(|b| format!("{}x={}", b.lower_bound, b.severity))
        .collect::<Vec<_>>()
        .join(", ");

    info!(
        pool = %cfg.pool_label,
        pool_address = cfg.pool_address.as_deref().unwrap_or("-"),
        source,
        sink,
        every_s = cfg.poll_interval.as_secs_f64(),
        io_timeout_ms = cfg.effective_io_timeout().as_millis() as u64,
        tvl_threshold_pct = ?cfg.thresholds.tvl_pct,
        ratio_threshold_pct = ?cfg.thresholds.ratio_pct,
        bands = %bands,
        cooldown_ms = ?cfg.alert_cooldown.map(|d| d.as_millis() as u64),
        "pool monitor starting"
    );
}

/// Applies CLI overrides on top of the environment.
pub fn apply_overrides(mut cfg: AppConfig, args: &RunArgs) -> AppConfig {
    if let Some(ms) = args.check_interval_ms {
        cfg.poll_interval = Duration::from_millis(ms);
    }
    if let Some(pct) = args.threshold {
        cfg.thresholds.tvl_pct = cfg.thresholds.tvl_pct.map(|_| pct);
        cfg.thresholds.ratio_pct = cfg.thresholds.ratio_pct.map(|_| pct);
    }
    cfg
}

/// Runs the monitor until Ctrl-C.
pub async fn run(cfg: AppConfig, args: RunArgs) -> Result<()> {
    let cfg = apply_overrides(cfg, &args);
    let monitor_cfg = cfg.monitor_config().context("invalid monitor configuration")?;

    let source = build_source(&cfg, args.source)?;
    let sink = build_sink(&cfg, args.dry_run)?;

    log_banner(&cfg, source.name(), sink.name());

    let handle = MonitorLoop::new(monitor_cfg, source, sink)?.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    let observations = handle.stop().await.context("monitor task failed")?;
    info!(observations, "pool monitor stopped");

    Ok(())
}

/// Sends a connectivity message and a sample alert through Telegram.
pub async fn test_sink(cfg: AppConfig) -> Result<()> {
    let Some(sink) = telegram_sink(&cfg)? else {
        bail!("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set");
    };

    info!(chat_id = %sink.config().chat_id, "testing telegram connection");

    sink.send_message(&format::connectivity_message(&cfg.pool_label, Utc::now()))
        .await
        .context("connectivity message failed; check the bot token and that the chat was started")?;
    info!("connectivity message sent");

    sink.deliver(&sample_alert())
        .await
        .context("sample alert failed")?;
    info!("sample alert sent");

    Ok(())
}

fn sample_alert() -> AlertEvent {
    AlertEvent {
        severity: Severity::High,
        metric: Metric::Tvl,
        delta_pct: -15.5,
        message: "TEST ALERT: this is what a real alert looks like".to_string(),
        observed_at: Utc::now(),
    }
}
