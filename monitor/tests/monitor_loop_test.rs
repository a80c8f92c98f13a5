
use std::time::Duration;

use monitor::{
    ConfigError, CycleOutcome, Metric, MonitorConfig, MonitorLoop, Severity, SeverityBands,
    SourceError, Thresholds,
};

use mock_io::{RecordingSink, ScriptedSource};

fn config(thresholds: Thresholds, cooldown: Option<Duration>) -> MonitorConfig {
    MonitorConfig::new(
        "CELO/cUSD",
        Duration::from_millis(1_000),
        Duration::from_millis(500),
        thresholds,
        SeverityBands::default(),
        cooldown,
    )
    .expect("valid config")
}

fn tvl_only(pct: f64) -> Thresholds {
    Thresholds {
        tvl_pct: Some(pct),
        ratio_pct: None,
    }
}

#[tokio::test]
async fn tvl_drop_after_baseline_raises_one_critical_alert() {
    let source = ScriptedSource::readings(&[(1_000_000.0, 1.02), (747_000.0, 1.02)]);
    let sink = RecordingSink::new();
    let mut monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    assert_eq!(monitor.run_cycle().await, CycleOutcome::Initialized);
    let outcome = monitor.run_cycle().await;
    assert_eq!(
        outcome,
        CycleOutcome::Evaluated {
            alerts: 1,
            suppressed: 0,
            failed: 0
        }
    );

    let alerts = sink.alerts().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].metric, Metric::Tvl);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert!((alerts[0].delta_pct - (-25.3)).abs() < 1e-6);
    assert_eq!(monitor.observations(), 2);
}

#[tokio::test(start_paused = true)]
async fn scheduled_loop_runs_first_cycle_immediately_then_every_interval() {
    let source = ScriptedSource::readings(&[(1_000_000.0, 1.02), (747_000.0, 1.02)]);
    let sink = RecordingSink::new();
    let monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    let handle = monitor.start();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let observations = handle.stop().await.unwrap();

    assert_eq!(observations, 2);
    let alerts = sink.alerts().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert!(sink.diagnostics().await.is_empty());
}

#[tokio::test]
async fn first_cycle_never_alerts() {
    // A reading that would cross any threshold if there were a baseline.
    let source = ScriptedSource::readings(&[(0.0, 1_000.0)]);
    let sink = RecordingSink::new();
    let mut monitor =
        MonitorLoop::new(config(Thresholds::uniform(0.001), None), source, sink.clone()).unwrap();

    assert_eq!(monitor.run_cycle().await, CycleOutcome::Initialized);
    assert!(sink.alerts().await.is_empty());
    assert!(monitor.baseline().is_some());
}

#[tokio::test]
async fn both_metrics_crossing_produce_two_ordered_events() {
    let source = ScriptedSource::readings(&[(100.0, 1.0), (70.0, 1.5)]);
    let sink = RecordingSink::new();
    let mut monitor =
        MonitorLoop::new(config(Thresholds::uniform(5.0), None), source, sink.clone()).unwrap();

    monitor.run_cycle().await;
    monitor.run_cycle().await;

    let alerts = sink.alerts().await;
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].metric, Metric::Tvl);
    assert_eq!(alerts[1].metric, Metric::Ratio);
}

#[tokio::test]
async fn zero_baseline_tvl_still_evaluates_ratio() {
    let source = ScriptedSource::readings(&[(0.0, 1.0), (5_000.0, 1.2)]);
    let sink = RecordingSink::new();
    let mut monitor =
        MonitorLoop::new(config(Thresholds::uniform(5.0), None), source, sink.clone()).unwrap();

    monitor.run_cycle().await;
    monitor.run_cycle().await;

    let alerts = sink.alerts().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].metric, Metric::Ratio);

    let status = monitor.view().get().await.unwrap();
    assert!(status.last_delta.unwrap().tvl_pct.is_undefined());
}

#[tokio::test]
async fn source_failure_reports_diagnostic_and_keeps_baseline_unset() {
    let source = ScriptedSource::new(vec![
        Err(SourceError::Unavailable("rpc down".into())),
        Ok(monitor::Snapshot::now(100.0, 1.0)),
        Ok(monitor::Snapshot::now(50.0, 1.0)),
    ]);
    let sink = RecordingSink::new();
    let mut monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    let outcome = monitor.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::SourceUnavailable { .. }));
    assert!(monitor.baseline().is_none());
    assert_eq!(monitor.observations(), 1);

    let diags = sink.diagnostics().await;
    assert_eq!(diags.len(), 1);
    assert!(diags[0].contains("rpc down"), "{}", diags[0]);

    // Baseline comes from the first *successful* reading.
    assert_eq!(monitor.run_cycle().await, CycleOutcome::Initialized);
    assert_eq!(monitor.baseline().unwrap().tvl, 100.0);

    monitor.run_cycle().await;
    assert_eq!(sink.alerts().await.len(), 1);
    assert_eq!(monitor.observations(), 3);
}

#[tokio::test]
async fn non_finite_reading_is_treated_as_unavailable() {
    let source = ScriptedSource::readings(&[(f64::NAN, 1.0)]);
    let sink = RecordingSink::new();
    let mut monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    let outcome = monitor.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::SourceUnavailable { .. }));
    assert!(monitor.baseline().is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_times_out_as_unavailable() {
    let source = ScriptedSource::readings(&[(100.0, 1.0)]).with_delay(Duration::from_secs(5));
    let sink = RecordingSink::new();
    let mut monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    match monitor.run_cycle().await {
        CycleOutcome::SourceUnavailable { reason } => {
            assert_eq!(reason, SourceError::Timeout(500).to_string());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(sink.diagnostics().await.len(), 1);
}

#[tokio::test]
async fn delivery_failure_does_not_stop_the_loop() {
    let source = ScriptedSource::readings(&[(100.0, 1.0), (50.0, 1.0), (40.0, 1.0)]);
    let sink = RecordingSink::rejecting();
    let mut monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    monitor.run_cycle().await;
    assert_eq!(
        monitor.run_cycle().await,
        CycleOutcome::Evaluated {
            alerts: 1,
            suppressed: 0,
            failed: 1
        }
    );
    monitor.run_cycle().await;

    assert_eq!(monitor.observations(), 3);
    assert_eq!(sink.alerts().await.len(), 2);
    assert_eq!(monitor.baseline().unwrap().tvl, 100.0);
}

#[tokio::test]
async fn without_cooldown_every_cycle_realerts() {
    let source = ScriptedSource::readings(&[(100.0, 1.0), (80.0, 1.0), (80.0, 1.0), (80.0, 1.0)]);
    let sink = RecordingSink::new();
    let mut monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    for _ in 0..4 {
        monitor.run_cycle().await;
    }
    assert_eq!(sink.alerts().await.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn cooldown_suppresses_repeats_but_not_escalations() {
    let source = ScriptedSource::readings(&[
        (100.0, 1.0),
        (88.0, 1.0), // -12%: high
        (88.0, 1.0), // same severity, suppressed
        (70.0, 1.0), // -30%: critical, escalation
    ]);
    let sink = RecordingSink::new();
    let mut monitor = MonitorLoop::new(
        config(tvl_only(5.0), Some(Duration::from_secs(600))),
        source,
        sink.clone(),
    )
    .unwrap();

    monitor.run_cycle().await;
    monitor.run_cycle().await;
    assert_eq!(
        monitor.run_cycle().await,
        CycleOutcome::Evaluated {
            alerts: 0,
            suppressed: 1,
            failed: 0
        }
    );
    monitor.run_cycle().await;

    let severities: Vec<_> = sink.alerts().await.iter().map(|a| a.severity).collect();
    assert_eq!(severities, vec![Severity::High, Severity::Critical]);
}

#[tokio::test(start_paused = true)]
async fn stop_lets_in_flight_cycle_finish() {
    let source = ScriptedSource::readings(&[(100.0, 1.0)]).with_delay(Duration::from_millis(400));
    let sink = RecordingSink::new();
    let monitor = MonitorLoop::new(config(tvl_only(5.0), None), source, sink.clone()).unwrap();

    let handle = monitor.start();
    let view = handle.view();

    // The first fetch is still sleeping at this point.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let observations = handle.stop().await.unwrap();

    assert_eq!(observations, 1);
    let status = view.get().await.unwrap();
    assert_eq!(status.last_outcome, CycleOutcome::Initialized);
}

#[tokio::test]
async fn view_tracks_latest_cycle() {
    let source = ScriptedSource::readings(&[(200.0, 2.0), (190.0, 2.0)]);
    let sink = RecordingSink::new();
    let mut monitor = MonitorLoop::new(config(tvl_only(10.0), None), source, sink).unwrap();
    let view = monitor.view();

    monitor.run_cycle().await;
    monitor.run_cycle().await;

    let status = view.get().await.unwrap();
    assert_eq!(status.observations, 2);
    assert_eq!(status.baseline.unwrap().tvl, 200.0);
    assert_eq!(status.last_snapshot.unwrap().tvl, 190.0);
    let tvl_delta = status.last_delta.unwrap().tvl_pct.value().unwrap();
    assert!((tvl_delta - (-5.0)).abs() < 1e-9);
    assert_eq!(
        status.last_outcome,
        CycleOutcome::Evaluated {
            alerts: 0,
            suppressed: 0,
            failed: 0
        }
    );
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let r = MonitorConfig::new(
        "CELO/cUSD",
        Duration::from_secs(1),
        Duration::from_secs(5),
        tvl_only(5.0),
        SeverityBands::default(),
        None,
    );
    assert!(matches!(r, Err(ConfigError::TimeoutNotBelowInterval { .. })));

    // Band tables loaded from serialized config get the same checks.
    assert!(serde_json::from_str::<SeverityBands>("[]").is_err());
}

#[tokio::test(start_paused = true)]
async fn overrunning_cycle_skips_missed_ticks_instead_of_bursting() {
    // Cycle 2 fetches for 850ms and delivers two alerts at 850ms each, so it runs
    // from t=1000 to t=3550 and misses the ticks at 2000 and 3000.
    let readings: Vec<(f64, f64)> = std::iter::once((100.0, 1.0))
        .chain(std::iter::once((50.0, 2.0)))
        .chain(std::iter::repeat((100.0, 1.0)).take(8))
        .collect();
    let source = ScriptedSource::readings(&readings)
        .with_delays(vec![Duration::ZERO, Duration::from_millis(850)]);
    let sink = RecordingSink::new().with_delay(Duration::from_millis(850));

    let cfg = MonitorConfig::new(
        "CELO/cUSD",
        Duration::from_millis(1_000),
        Duration::from_millis(900),
        Thresholds::uniform(5.0),
        SeverityBands::default(),
        None,
    )
    .unwrap();
    let handle = MonitorLoop::new(cfg, source, sink.clone()).unwrap().start();

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    let observations = handle.stop().await.unwrap();

    // Cycles start at 0, 1000, 3550 (one late tick), 4000 and 5000. Queued ticks
    // would add a second cycle at 3550.
    assert_eq!(observations, 5);
    assert_eq!(sink.alerts().await.len(), 2);
    assert!(sink.diagnostics().await.is_empty());
}
