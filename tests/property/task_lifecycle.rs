// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Task Lifecycle

use chrono::Utc;
use cim_infrastructure_vcd::domain::TaskStatus;
use cim_infrastructure_vcd::state_machine::{StateMachine, StateMachineWithHistory};
use proptest::prelude::*;

fn status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

proptest! {
    /// Property: terminal states reject every observation
    #[test]
    fn prop_terminal_states_are_final(from in status(), observed in status()) {
        prop_assert_eq!(from.transition(&observed).is_ok(), !from.is_terminal());
    }

    /// Property: history stops growing at the first terminal observation
    #[test]
    fn prop_history_ends_at_first_terminal(observations in prop::collection::vec(status(), 0..20)) {
        let mut machine = StateMachineWithHistory::new(TaskStatus::Queued);
        let mut accepted = 0usize;

        for observed in &observations {
            match machine.transition_with_history(*observed, Utc::now()) {
                Ok(output) => {
                    accepted += 1;
                    prop_assert_eq!(output.terminal, observed.is_terminal());
                }
                Err(_) => prop_assert!(machine.current_state().is_terminal()),
            }
        }

        let expected = observations
            .iter()
            .position(|s| s.is_terminal())
            .map(|i| i + 1)
            .unwrap_or(observations.len());
        prop_assert_eq!(accepted, expected);
        prop_assert_eq!(machine.history().len(), expected);
    }
}
