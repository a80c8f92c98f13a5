//! Monitor loop.
//!
//! Data flow per cycle:
//! MetricSource → BaselineTracker → ThresholdEvaluator → AlertDebouncer → AlertSink
//!
//! One task owns the loop and awaits each cycle inline, so cycles never overlap.
//! Ticks that fall due while a cycle is still running are skipped, not queued.

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval, timeout};
use tracing::{Instrument, debug, error, info, warn};

use common::logger::{TraceId, cycle_span, warn_if_slow};

use crate::baseline::BaselineTracker;
use crate::config::MonitorConfig;
use crate::debounce::AlertDebouncer;
use crate::error::{ConfigError, DeliveryError, SourceError};
use crate::sink::AlertSink;
use crate::source::MetricSource;
use crate::threshold::ThresholdEvaluator;
use crate::types::{AlertEvent, Baseline, Delta, Snapshot};
use crate::view::{CycleOutcome, MonitorStatus, MonitorViewStore};

pub struct MonitorLoop<S, K> {
    config: MonitorConfig,
    source: S,
    sink: K,
    tracker: BaselineTracker,
    evaluator: ThresholdEvaluator,
    debouncer: AlertDebouncer,
    /// Completed cycles, failed fetches included.
    observations: u64,
    view: MonitorViewStore,
}

impl<S: MetricSource, K: AlertSink> MonitorLoop<S, K> {
    pub fn new(config: MonitorConfig, source: S, sink: K) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            evaluator: ThresholdEvaluator::new(config.severity_bands.clone()),
            debouncer: AlertDebouncer::new(config.alert_cooldown),
            tracker: BaselineTracker::new(),
            observations: 0,
            view: MonitorViewStore::new(),
            config,
            source,
            sink,
        })
    }

    /// Publish status into an existing store instead of a private one.
    pub fn with_view(mut self, view: MonitorViewStore) -> Self {
        self.view = view;
        self
    }

    pub fn view(&self) -> MonitorViewStore {
        self.view.clone()
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.tracker.baseline()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Runs a single poll/evaluate/alert cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let trace_id = TraceId::new();
        let span = cycle_span(&self.config.label, self.observations + 1, &trace_id);
        self.cycle_inner().instrument(span).await
    }

    async fn cycle_inner(&mut self) -> CycleOutcome {
        let snapshot = match self.fetch().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, source = self.source.name(), "fetch failed; cycle aborted");

                let message = format!("Error monitoring {}: {e}", self.config.label);
                if let Err(de) = self.bounded(self.sink.deliver_diagnostic(&message)).await {
                    error!(error = %de, sink = self.sink.name(), "diagnostic delivery failed");
                }

                let outcome = CycleOutcome::SourceUnavailable {
                    reason: e.to_string(),
                };
                self.finish(None, None, outcome.clone()).await;
                return outcome;
            }
        };

        debug!(tvl = snapshot.tvl, ratio = snapshot.ratio, "snapshot fetched");

        let Some(delta) = self.tracker.observe(&snapshot) else {
            info!(
                tvl = snapshot.tvl,
                ratio = snapshot.ratio,
                "first reading pinned as baseline; nothing to evaluate"
            );
            self.finish(Some(snapshot), None, CycleOutcome::Initialized)
                .await;
            return CycleOutcome::Initialized;
        };

        info!(
            tvl = snapshot.tvl,
            tvl_delta = %delta.tvl_pct,
            ratio = snapshot.ratio,
            ratio_delta = %delta.ratio_pct,
            "pool checked"
        );

        let events = self
            .evaluator
            .evaluate(&delta, &self.config.thresholds, snapshot.observed_at);

        let (mut alerts, mut suppressed, mut failed) = (0, 0, 0);
        for event in events {
            let now = Instant::now();
            if !self.debouncer.admit(&event, now) {
                debug!(
                    metric = %event.metric,
                    severity = %event.severity,
                    "alert suppressed by cooldown"
                );
                suppressed += 1;
                continue;
            }

            alerts += 1;
            match self.deliver(&event).await {
                Ok(()) => {
                    warn!(
                        metric = %event.metric,
                        severity = %event.severity,
                        delta_pct = event.delta_pct,
                        sink = self.sink.name(),
                        "alert delivered"
                    );
                    self.debouncer.record(&event, now);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        metric = %event.metric,
                        severity = %event.severity,
                        sink = self.sink.name(),
                        "alert delivery failed"
                    );
                    failed += 1;
                }
            }
        }

        let outcome = CycleOutcome::Evaluated {
            alerts,
            suppressed,
            failed,
        };
        self.finish(Some(snapshot), Some(delta), outcome.clone())
            .await;
        outcome
    }

    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let limit = self.config.io_timeout;
        let snapshot = match timeout(limit, warn_if_slow("fetch", limit / 2, self.source.fetch()))
            .await
        {
            Ok(r) => r?,
            Err(_) => return Err(SourceError::Timeout(limit.as_millis() as u64)),
        };

        if !snapshot.tvl.is_finite() || !snapshot.ratio.is_finite() {
            return Err(SourceError::Unavailable(format!(
                "non-finite reading (tvl={}, ratio={})",
                snapshot.tvl, snapshot.ratio
            )));
        }
        Ok(snapshot)
    }

    async fn deliver(&self, event: &AlertEvent) -> Result<(), DeliveryError> {
        self.bounded(self.sink.deliver(event)).await
    }

    async fn bounded<F>(&self, fut: F) -> Result<(), DeliveryError>
    where
        F: Future<Output = Result<(), DeliveryError>>,
    {
        let limit = self.config.io_timeout;
        match timeout(limit, warn_if_slow("deliver", limit / 2, fut)).await {
            Ok(r) => r,
            Err(_) => Err(DeliveryError::Timeout(limit.as_millis() as u64)),
        }
    }

    async fn finish(
        &mut self,
        snapshot: Option<Snapshot>,
        delta: Option<Delta>,
        outcome: CycleOutcome,
    ) {
        self.observations += 1;

        let previous = self.view.get().await;
        let last_snapshot = snapshot.or_else(|| previous.and_then(|p| p.last_snapshot));

        self.view
            .set(MonitorStatus {
                observations: self.observations,
                baseline: self.tracker.baseline(),
                last_snapshot,
                last_delta: delta,
                last_outcome: outcome,
            })
            .await;
    }

    /// Spawns the schedule. The first cycle runs immediately.
    ///
    /// Dropping the returned handle detaches the monitor; only
    /// [`MonitorHandle::stop`] ends it.
    pub fn start(self) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let view = self.view.clone();
        let task = tokio::spawn(self.run(shutdown_rx));

        MonitorHandle {
            shutdown: shutdown_tx,
            task,
            view,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let every = self.config.poll_interval;
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            monitor = %self.config.label,
            source = self.source.name(),
            sink = self.sink.name(),
            every_ms = every.as_millis() as u64,
            "monitor started"
        );

        let mut detached = false;
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed(), if !detached => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => break,
                        Ok(()) => continue,
                        Err(_) => {
                            debug!("monitor handle dropped; running detached");
                            detached = true;
                            continue;
                        }
                    }
                }
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            self.run_cycle().await;

            let elapsed = started.elapsed();
            if elapsed > every {
                let missed = (elapsed.as_nanos() / every.as_nanos()) as u64;
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    missed_ticks = missed,
                    "cycle overran poll interval; missed ticks skipped"
                );
            }
        }

        info!(
            monitor = %self.config.label,
            observations = self.observations,
            "monitor stopped"
        );
        self.observations
    }
}

/// Control handle for a running monitor.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
    view: MonitorViewStore,
}

impl MonitorHandle {
    pub fn view(&self) -> MonitorViewStore {
        self.view.clone()
    }

    /// Cancels the schedule and waits for an in-flight cycle to finish.
    ///
    /// Returns the final observation count.
    pub async fn stop(self) -> Result<u64, JoinError> {
        let _ = self.shutdown.send(true);
        self.task.await
    }
}
