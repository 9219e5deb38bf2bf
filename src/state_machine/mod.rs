// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic state machine types used to model remote task lifecycles.
//! Transitions are pure functions: the caller observes something, feeds it
//! in as input, and gets back the next state plus an output describing the
//! step. Recording the step (with a timestamp) is the job of
//! [`StateMachineWithHistory`].
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! # Example
//!
//! ```rust
//! use cim_infrastructure_vcd::domain::TaskStatus;
//! use cim_infrastructure_vcd::state_machine::StateMachine;
//!
//! let (next, output) = TaskStatus::Queued.transition(&TaskStatus::Running).unwrap();
//! assert_eq!(next, TaskStatus::Running);
//! assert!(!output.terminal);
//!
//! // Terminal states accept nothing
//! assert!(TaskStatus::Success.transition(&TaskStatus::Running).is_err());
//! ```

pub mod task_lifecycle;

pub use task_lifecycle::TaskTransitionOutput;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;
}

/// Transition metadata
///
/// Records information about a state transition for auditing.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S, I> {
    /// State before transition
    pub from: S,

    /// State after transition
    pub to: S,

    /// Input that triggered transition
    pub input: I,

    /// Timestamp of transition
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<S, I> Transition<S, I> {
    /// Create a new transition record
    pub fn new(from: S, to: S, input: I, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            from,
            to,
            input,
            timestamp,
        }
    }
}

/// State machine with history
///
/// Wraps a state machine and tracks transition history.
#[derive(Debug, Clone)]
pub struct StateMachineWithHistory<FSM: StateMachine> {
    current: FSM,
    history: Vec<Transition<FSM, FSM::Input>>,
}

impl<FSM: StateMachine> StateMachineWithHistory<FSM> {
    /// Create a new state machine with history tracking
    pub fn new(initial: FSM) -> Self {
        Self {
            current: initial,
            history: Vec::new(),
        }
    }

    /// Transition with history recording
    pub fn transition_with_history(
        &mut self,
        input: FSM::Input,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> TransitionResult<FSM::Output>
    where
        FSM::Input: Clone,
    {
        let from = self.current.clone();
        let (to, output) = self.current.transition(&input)?;

        self.history
            .push(Transition::new(from, to.clone(), input, timestamp));

        self.current = to;
        Ok(output)
    }

    /// Get transition history
    pub fn history(&self) -> &[Transition<FSM, FSM::Input>] {
        &self.history
    }

    /// Consume the machine, keeping only its history
    pub fn into_history(self) -> Vec<Transition<FSM, FSM::Input>> {
        self.history
    }

    /// Get current state
    pub fn current_state(&self) -> &FSM {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // Simple test FSM: On/Off switch
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Switch {
        Off,
        On,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SwitchInput {
        Press,
    }

    impl StateMachine for Switch {
        type Input = SwitchInput;
        type Output = ();

        fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
            match (self, input) {
                (Switch::Off, SwitchInput::Press) => Ok((Switch::On, ())),
                (Switch::On, SwitchInput::Press) => Ok((Switch::Off, ())),
            }
        }
    }

    #[test]
    fn test_simple_transition() {
        let switch = Switch::Off;
        let (new_state, _) = switch.transition(&SwitchInput::Press).unwrap();
        assert_eq!(new_state, Switch::On);
    }

    #[test]
    fn test_state_machine_with_history() {
        let mut fsm = StateMachineWithHistory::new(Switch::Off);

        fsm.transition_with_history(SwitchInput::Press, Utc::now())
            .unwrap();
        assert_eq!(*fsm.current_state(), Switch::On);
        assert_eq!(fsm.history().len(), 1);

        fsm.transition_with_history(SwitchInput::Press, Utc::now())
            .unwrap();
        assert_eq!(*fsm.current_state(), Switch::Off);

        let history = fsm.into_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].from, Switch::Off);
        assert_eq!(history[1].to, Switch::Off);
    }
}
