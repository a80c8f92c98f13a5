use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::types::{Baseline, Delta, Snapshot};

/// What the most recent cycle ended with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// First successful reading; baseline pinned, nothing evaluated.
    Initialized,
    /// `alerts` counts dispatched events, `failed` the subset the sink rejected.
    Evaluated {
        alerts: usize,
        suppressed: usize,
        failed: usize,
    },
    SourceUnavailable { reason: String },
}

/// Immutable view of a monitor after a cycle, for dashboards and status pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub observations: u64,
    pub baseline: Option<Baseline>,
    pub last_snapshot: Option<Snapshot>,
    pub last_delta: Option<Delta>,
    pub last_outcome: CycleOutcome,
}

/// Latest-status handle shared between the loop and its readers.
/// Last write wins.
#[derive(Clone, Default)]
pub struct MonitorViewStore {
    inner: Arc<RwLock<Option<MonitorStatus>>>,
}

impl MonitorViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, status: MonitorStatus) {
        let mut g = self.inner.write().await;
        *g = Some(status);
    }

    /// `None` until the first cycle completes.
    pub async fn get(&self) -> Option<MonitorStatus> {
        let g = self.inner.read().await;
        g.clone()
    }
}
