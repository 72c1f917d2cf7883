use std::time::Duration;

/// Fixed retry schedule for a single delivery.
///
/// `backoff[n]` is the wait between attempt `n + 1` and attempt `n + 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Build a policy from millisecond delays as they appear in configuration.
    pub fn from_millis(max_attempts: u32, backoff_ms: &[u64]) -> Self {
        Self::new(
            max_attempts,
            backoff_ms.iter().map(|ms| Duration::from_millis(*ms)).collect(),
        )
    }

    /// Wait required before the 1-based `attempt`. Attempt 1 never waits.
    ///
    /// When the schedule is shorter than the number of retries, the last delay
    /// is reused.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let idx = (attempt - 2) as usize;
        self.backoff
            .get(idx)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Returns `true` when another attempt may follow `attempt`.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_millis(3, &[1_000, 5_000])
    }
}

#[cfg(test)]
mod tests {
    use super::RetryPolicy;
    use std::time::Duration;

    #[test]
    fn given_default_policy_when_inspected_should_allow_three_attempts_with_two_waits() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_secs(1));
        assert_eq!(policy.delay_before(3), Duration::from_secs(5));
    }

    #[test]
    fn given_attempt_counts_when_can_retry_should_stop_at_max() {
        let policy = RetryPolicy::default();
        assert!(policy.can_retry(1));
        assert!(policy.can_retry(2));
        assert!(!policy.can_retry(3));
    }

    #[test]
    fn given_short_schedule_when_delay_past_end_should_reuse_last() {
        let policy = RetryPolicy::from_millis(4, &[100]);
        assert_eq!(policy.delay_before(4), Duration::from_millis(100));
    }

    #[test]
    fn given_zero_attempts_when_built_should_clamp_to_one() {
        let policy = RetryPolicy::new(0, vec![]);
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.can_retry(1));
    }
}
