use std::time::Duration;
use tracing::debug;

/// Remaining wait time of one probe, in milliseconds.
///
/// The remaining budget never grows and never drops below zero, so a late
/// spurious wake-up turns the next wait into a non-blocking poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineBudget {
    configured_ms: u64,
    remaining_ms: u64,
}

impl DeadlineBudget {
    pub fn new(configured_ms: u64) -> Self {
        Self {
            configured_ms,
            remaining_ms: configured_ms,
        }
    }

    pub fn configured_ms(&self) -> u64 {
        self.configured_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_ms == 0
    }

    /// Recompute the budget from the time elapsed since the request was sent.
    pub fn shrink(&mut self, elapsed: Duration) -> u64 {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let recomputed = self.configured_ms.saturating_sub(elapsed_ms);
        self.remaining_ms = self.remaining_ms.min(recomputed);
        debug!(
            elapsed_ms,
            remaining_ms = self.remaining_ms,
            "Deadline budget recomputed"
        );
        self.remaining_ms
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_budget_never_increases(
            configured in 0u64..10_000,
            wakes in proptest::collection::vec(0u64..20_000_000, 1..32),
        ) {
            let mut budget = DeadlineBudget::new(configured);
            let mut previous = budget.remaining_ms();
            for micros in wakes {
                let remaining = budget.shrink(Duration::from_micros(micros));
                prop_assert!(remaining <= previous);
                prop_assert!(remaining <= configured);
                previous = remaining;
            }
        }
    }
}
