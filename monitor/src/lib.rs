//! Periodic metric monitor.
//!
//! A [`MonitorLoop`] polls a [`MetricSource`] on a fixed cadence, pins the first
//! reading as the baseline, and hands every threshold crossing to an [`AlertSink`].

pub mod baseline;
pub mod config;
pub mod debounce;
pub mod error;
pub mod runner;
pub mod sink;
pub mod source;
pub mod threshold;
pub mod types;
pub mod view;

pub use baseline::BaselineTracker;
pub use config::{MonitorConfig, SeverityBand, SeverityBands, Thresholds};
pub use error::{ConfigError, DeliveryError, SourceError};
pub use runner::{MonitorHandle, MonitorLoop};
pub use sink::AlertSink;
pub use source::MetricSource;
pub use threshold::ThresholdEvaluator;
pub use types::{AlertEvent, Baseline, Delta, DeltaPct, Metric, Severity, Snapshot};
pub use view::{CycleOutcome, MonitorStatus, MonitorViewStore};
