// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Poll Backoff

use cim_infrastructure_vcd::PollPolicy;
use proptest::prelude::*;
use std::time::Duration;

fn policy() -> impl Strategy<Value = PollPolicy> {
    (1u64..5_000, 0u64..60_000, 1.0f64..4.0).prop_map(|(min_ms, extra_ms, multiplier)| {
        PollPolicy {
            min_interval: Duration::from_millis(min_ms),
            max_interval: Duration::from_millis(min_ms + extra_ms),
            multiplier,
            timeout: None,
        }
    })
}

proptest! {
    /// Property: every generated policy validates
    #[test]
    fn prop_generated_policies_are_valid(policy in policy()) {
        prop_assert!(policy.validate().is_ok());
    }

    /// Property: intervals stay within [min, max] for any starting point
    #[test]
    fn prop_next_interval_is_bounded(policy in policy(), current_ms in 0u64..600_000) {
        let next = policy.next_interval(Duration::from_millis(current_ms));
        prop_assert!(next >= policy.min_interval);
        prop_assert!(next <= policy.max_interval);
    }

    /// Property: the interval sequence never shrinks and reaches max
    #[test]
    fn prop_backoff_is_monotonic(policy in policy()) {
        let mut interval = policy.first_interval();
        for _ in 0..64 {
            let next = policy.next_interval(interval);
            prop_assert!(next >= interval);
            interval = next;
        }
        if policy.multiplier >= 1.5 {
            prop_assert_eq!(interval, policy.max_interval);
        }
    }
}
