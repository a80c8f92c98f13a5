//! Baseline tracking.
//!
//! The first snapshot a monitor sees becomes its reference point for the rest of
//! the process lifetime. Every later snapshot is expressed as a percentage change
//! against it.

use tracing::{info, warn};

use crate::types::{Baseline, Delta, DeltaPct, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
enum TrackerState {
    Uninitialized,
    Tracking(Baseline),
}

/// One-way `Uninitialized -> Tracking` state machine.
///
/// No reset: a new baseline means a new tracker.
#[derive(Debug, Clone)]
pub struct BaselineTracker {
    state: TrackerState,
}

impl BaselineTracker {
    pub fn new() -> Self {
        Self {
            state: TrackerState::Uninitialized,
        }
    }

    /// Feeds one snapshot.
    ///
    /// Returns `None` for the snapshot that initializes the baseline, so the first
    /// observation can never produce an alert.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Option<Delta> {
        match self.state {
            TrackerState::Uninitialized => {
                let baseline = Baseline::from(snapshot);
                info!(
                    tvl = baseline.tvl,
                    ratio = baseline.ratio,
                    "baseline initialized"
                );
                self.state = TrackerState::Tracking(baseline);
                None
            }
            TrackerState::Tracking(baseline) => {
                let delta = Delta {
                    tvl_pct: DeltaPct::between(baseline.tvl, snapshot.tvl),
                    ratio_pct: DeltaPct::between(baseline.ratio, snapshot.ratio),
                };
                if delta.tvl_pct.is_undefined() {
                    warn!(baseline_tvl = baseline.tvl, "tvl delta undefined; skipping field");
                }
                if delta.ratio_pct.is_undefined() {
                    warn!(baseline_ratio = baseline.ratio, "ratio delta undefined; skipping field");
                }
                Some(delta)
            }
        }
    }

    pub fn baseline(&self) -> Option<Baseline> {
        match self.state {
            TrackerState::Uninitialized => None,
            TrackerState::Tracking(b) => Some(b),
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackerState::Tracking(_))
    }
}

impl Default for BaselineTracker {
    fn default() -> Self {
        Self::new()
    }
}
