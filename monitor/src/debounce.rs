//! Opt-in alert cooldown.
//!
//! With no cooldown configured every cycle beyond threshold alerts again. With a
//! cooldown, a metric that already alerted stays quiet until the cooldown
//! elapses, unless its severity escalates.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::{AlertEvent, Metric, Severity};

#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    cooldown: Option<Duration>,
    last_delivered: HashMap<Metric, (Instant, Severity)>,
}

impl AlertDebouncer {
    pub fn new(cooldown: Option<Duration>) -> Self {
        Self {
            cooldown,
            last_delivered: HashMap::new(),
        }
    }

    /// Whether `event` should go out at `now`.
    pub fn admit(&self, event: &AlertEvent, now: Instant) -> bool {
        let Some(cooldown) = self.cooldown else {
            return true;
        };
        match self.last_delivered.get(&event.metric) {
            Some((at, severity)) => {
                event.severity > *severity || now.saturating_duration_since(*at) >= cooldown
            }
            None => true,
        }
    }

    /// Marks `event` as delivered. Failed deliveries are not recorded so the
    /// next cycle gets another chance.
    pub fn record(&mut self, event: &AlertEvent, now: Instant) {
        if self.cooldown.is_some() {
            self.last_delivered
                .insert(event.metric, (now, event.severity));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.cooldown.is_some()
    }
}
