//! Threshold evaluation.
//!
//! Turns a [`Delta`] into zero, one or two [`AlertEvent`]s. Fields are evaluated
//! independently and always in [`Metric::ALL`] order.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{SeverityBands, Thresholds};
use crate::types::{AlertEvent, Delta, DeltaPct, Metric, Severity};

#[derive(Debug, Clone, Default)]
pub struct ThresholdEvaluator {
    bands: SeverityBands,
}

impl ThresholdEvaluator {
    pub fn new(bands: SeverityBands) -> Self {
        Self { bands }
    }

    /// Evaluates every metric that has both a threshold and a defined delta.
    pub fn evaluate(
        &self,
        delta: &Delta,
        thresholds: &Thresholds,
        observed_at: DateTime<Utc>,
    ) -> Vec<AlertEvent> {
        Metric::ALL
            .into_iter()
            .filter_map(|metric| {
                let threshold = thresholds.get(metric)?;
                self.evaluate_field(metric, delta.get(metric), threshold, observed_at)
            })
            .collect()
    }

    /// Produces an event when `|delta_pct| >= threshold` (inclusive).
    pub fn evaluate_field(
        &self,
        metric: Metric,
        delta_pct: DeltaPct,
        threshold: f64,
        observed_at: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        let pct = delta_pct.value()?;
        let magnitude = pct.abs();
        if magnitude < threshold {
            debug!(%metric, delta_pct = pct, threshold, "within threshold");
            return None;
        }

        let multiple = magnitude / threshold;
        // Empty tables are rejected at construction; top severity if one slips through.
        let severity = self.bands.classify(multiple).unwrap_or(Severity::Critical);

        Some(AlertEvent {
            severity,
            metric,
            delta_pct: pct,
            message: format!(
                "{metric} changed {pct:+.2}% from baseline ({multiple:.2}x the {threshold}% threshold)"
            ),
            observed_at,
        })
    }

    pub fn bands(&self) -> &SeverityBands {
        &self.bands
    }
}
