use std::future::Future;
use std::time::{Duration, Instant};

use tracing::Span;

use super::TraceId;

/// Root span for a single monitor cycle.
pub fn cycle_span(monitor: &str, cycle: u64, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        monitor = %monitor,
        cycle,
        trace_id = %trace_id,
    )
}

/// Awaits `fut`, emitting a `performance` warning when it outlives `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
