// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task Lifecycle State Machine
//!
//! The remote control plane owns the real task state; the client only ever
//! observes it. This machine validates the sequence of observations a
//! [`TaskHandle`](crate::task::TaskHandle) sees while polling.
//!
//! # States
//!
//! - Queued, PreRunning, Running: in flight
//! - Success, Error, Aborted, Cancelled: terminal
//!
//! # Inputs
//!
//! The status reported by one poll. Any in-flight state may move to any
//! state (the remote is free to re-queue work). Terminal states accept no
//! further input.

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::TaskStatus;

/// Output of one observed task transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTransitionOutput {
    /// The observation differs from the previous state
    pub changed: bool,

    /// The new state is terminal
    pub terminal: bool,
}

impl StateMachine for TaskStatus {
    type Input = TaskStatus;
    type Output = TaskTransitionOutput;

    fn transition(&self, observed: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        if self.is_terminal() {
            return Err(TransitionError::InvalidTransition {
                from: self.to_string(),
                to: observed.to_string(),
            });
        }

        Ok((
            *observed,
            TaskTransitionOutput {
                changed: observed != self,
                terminal: observed.is_terminal(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_queued_to_running() {
        let (next, output) = TaskStatus::Queued
            .transition(&TaskStatus::Running)
            .expect("Transition should succeed");

        assert_eq!(next, TaskStatus::Running);
        assert!(output.changed);
        assert!(!output.terminal);
    }

    #[test]
    fn test_running_observed_again_is_unchanged() {
        let (next, output) = TaskStatus::Running
            .transition(&TaskStatus::Running)
            .expect("Transition should succeed");

        assert_eq!(next, TaskStatus::Running);
        assert!(!output.changed);
    }

    #[test]
    fn test_requeue_is_allowed() {
        assert!(TaskStatus::Running.transition(&TaskStatus::Queued).is_ok());
    }

    #[test_case(TaskStatus::Success; "success")]
    #[test_case(TaskStatus::Error; "error")]
    #[test_case(TaskStatus::Aborted; "aborted")]
    #[test_case(TaskStatus::Cancelled; "cancelled")]
    fn test_terminal_states_reject_input(state: TaskStatus) {
        for observed in TaskStatus::ALL {
            let result = state.transition(&observed);
            assert!(matches!(
                result,
                Err(TransitionError::InvalidTransition { .. })
            ));
        }
    }

    #[test_case(TaskStatus::Running, TaskStatus::Success; "running to success")]
    #[test_case(TaskStatus::PreRunning, TaskStatus::Error; "prerunning to error")]
    #[test_case(TaskStatus::Queued, TaskStatus::Cancelled; "queued to cancelled")]
    fn test_reaching_terminal_state(from: TaskStatus, to: TaskStatus) {
        let (next, output) = from.transition(&to).expect("Transition should succeed");
        assert_eq!(next, to);
        assert!(output.terminal);
    }
}
