// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for control plane orchestration

use std::fmt;

use thiserror::Error;

use crate::domain::NetworkError;
use crate::state_machine::TransitionError;

/// Why a local wait was abandoned before the remote task finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// The caller's cancellation token fired
    Cancelled,
    /// The poll policy's overall deadline elapsed
    DeadlineExceeded,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::Cancelled => write!(f, "cancelled by caller"),
            AbandonReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Errors that can occur while locating, mutating or reconciling resources
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The remote rejected the request (malformed, unauthorized, conflicting)
    #[error("Request rejected with status {status}: {message}")]
    RequestRejected { status: u16, message: String },

    /// The addressed resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// More than one record matched a name that must be unique
    #[error("Ambiguous result: {count} {kind} records named '{name}'")]
    AmbiguousResult {
        kind: String,
        name: String,
        count: usize,
    },

    /// The name cannot be carried in an unencoded query filter
    #[error("Invalid resource name '{0}': must not contain any of & # ; ( )")]
    InvalidName(String),

    /// The remote task finished in the error state
    #[error("Task {task} ({operation}) failed: {message} [major {major_error_code}, minor {minor_error_code}]")]
    TaskFailed {
        task: String,
        operation: String,
        message: String,
        major_error_code: i32,
        minor_error_code: String,
    },

    /// The remote task was aborted
    #[error("Task {task} ({operation}) aborted: {message} [major {major_error_code}, minor {minor_error_code}]")]
    TaskAborted {
        task: String,
        operation: String,
        message: String,
        major_error_code: i32,
        minor_error_code: String,
    },

    /// The remote task was cancelled
    #[error("Task {task} ({operation}) was cancelled")]
    TaskCancelled { task: String, operation: String },

    /// A resource the operation depends on is missing
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Post-verification contradicts the reported task outcome
    #[error("Inconsistent remote state: {0}")]
    Inconsistent(String),

    /// The local wait was abandoned; the remote task keeps running
    #[error("Wait on task {task} abandoned: {reason}")]
    ContextCancelled { task: String, reason: AbandonReason },

    /// The resource definition violates a local invariant
    #[error("Invalid definition: {0}")]
    InvalidDefinition(#[from] NetworkError),

    /// The remote reported an impossible task transition
    #[error("Invalid task transition: {0}")]
    InvalidTransition(#[from] TransitionError),

    /// Connection or protocol failure talking to the control plane
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl OrchestrationError {
    /// Whether the error only means the addressed resource is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrchestrationError::NotFound(_))
    }
}

/// Result type for orchestration operations
pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

impl From<serde_json::Error> for OrchestrationError {
    fn from(err: serde_json::Error) -> Self {
        OrchestrationError::Serialization(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for OrchestrationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OrchestrationError::Serialization(err.to_string())
        } else {
            OrchestrationError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let failed = OrchestrationError::TaskFailed {
            task: "t1".to_string(),
            operation: "Creating external network".to_string(),
            message: "port group in use".to_string(),
            major_error_code: 400,
            minor_error_code: "BAD_REQUEST".to_string(),
        };
        assert!(!failed.is_not_found());
        assert!(OrchestrationError::NotFound("net-A".to_string()).is_not_found());
    }

    #[test]
    fn test_error_display_carries_remote_detail() {
        let err = OrchestrationError::TaskAborted {
            task: "https://vcd/api/task/1".to_string(),
            operation: "Deleting external network".to_string(),
            message: "aborted by administrator".to_string(),
            major_error_code: 500,
            minor_error_code: "INTERNAL_SERVER_ERROR".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("aborted by administrator"));
        assert!(text.contains("major 500"));
    }

    #[test]
    fn test_abandon_reason_display() {
        let err = OrchestrationError::ContextCancelled {
            task: "t".to_string(),
            reason: AbandonReason::DeadlineExceeded,
        };
        assert_eq!(err.to_string(), "Wait on task t abandoned: deadline exceeded");
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: OrchestrationError = parse.unwrap_err().into();
        assert!(matches!(err, OrchestrationError::Serialization(_)));
    }
}
