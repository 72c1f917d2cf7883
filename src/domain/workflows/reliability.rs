use crate::domain::entities::subscription::Subscription;
use crate::domain::value_objects::timestamps::Timestamp;

pub const AUTO_DISABLE_REASON: &str = "sustained delivery failure rate";

/// Auto-disable policy over a rolling window of delivery outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityPolicy {
    pub window_size: usize,
    pub failure_rate_threshold: f64,
    /// Outcomes required in the window before the circuit may trip.
    pub min_samples: usize,
}

/// What a single [`ReliabilityPolicy::apply`] did to the subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliabilityUpdate {
    pub failure_rate: f64,
    pub disabled_now: bool,
}

impl ReliabilityPolicy {
    pub fn new(window_size: usize, failure_rate_threshold: f64) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            failure_rate_threshold,
            min_samples: window_size,
        }
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples.clamp(1, self.window_size);
        self
    }

    /// Record one completed delivery on `sub` and evaluate the circuit.
    ///
    /// Callers must hold exclusive access to `sub` for the whole
    /// read-modify-write.
    pub fn apply(&self, sub: &mut Subscription, success: bool, now: Timestamp) -> ReliabilityUpdate {
        // Step 1: Update cumulative counters.
        sub.total_deliveries = sub.total_deliveries.saturating_add(1);
        if success {
            sub.consecutive_failures = 0;
            sub.last_success_at = Some(now);
        } else {
            sub.failed_deliveries = sub.failed_deliveries.saturating_add(1);
            sub.consecutive_failures = sub.consecutive_failures.saturating_add(1);
        }
        sub.last_triggered_at = Some(now);
        sub.updated_at = now;

        // Step 2: Push into the bounded window.
        sub.recent_outcomes.push(success);
        if sub.recent_outcomes.len() > self.window_size {
            let excess = sub.recent_outcomes.len() - self.window_size;
            sub.recent_outcomes.drain(..excess);
        }

        // Step 3: Trip the circuit; never close it here.
        let failure_rate = self.failure_rate(&sub.recent_outcomes);
        let mut disabled_now = false;
        let enough = sub.recent_outcomes.len() >= self.min_samples;
        if enough && failure_rate > self.failure_rate_threshold && sub.active {
            sub.active = false;
            sub.disabled_reason = Some(AUTO_DISABLE_REASON.to_string());
            disabled_now = true;
        }

        ReliabilityUpdate {
            failure_rate,
            disabled_now,
        }
    }

    /// Failure rate over the recorded window, `0.0` when empty.
    pub fn failure_rate(&self, outcomes: &[bool]) -> f64 {
        if outcomes.is_empty() {
            return 0.0;
        }
        let failed = outcomes.iter().filter(|ok| !**ok).count();
        failed as f64 / outcomes.len() as f64
    }
}

impl Default for ReliabilityPolicy {
    fn default() -> Self {
        Self::new(20, 0.5)
    }
}
