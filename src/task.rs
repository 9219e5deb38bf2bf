// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task handles
//!
//! A [`TaskHandle`] tracks one remote task until it reaches a terminal state.
//! Waiting is an explicit poll loop on the tokio clock:
//!
//! ```text
//! loop until terminal:
//!     sleep(interval)            ◄── cancel / deadline abandon here
//!     get_task(href)             ◄── ... or here
//!     lifecycle.transition(observed status)
//!     on_progress(record)
//!     interval = next_interval(interval)
//! ```
//!
//! Abandoning a wait is local only: the remote task keeps running and no
//! abort or delete request is sent.

use chrono::Utc;
use std::sync::Arc;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollPolicy;
use crate::control_plane::ControlPlane;
use crate::domain::{TaskRecord, TaskStatus};
use crate::errors::{AbandonReason, OrchestrationError, OrchestrationResult};
use crate::state_machine::{StateMachineWithHistory, Transition};

/// A task that finished successfully
#[derive(Debug, Clone)]
pub struct CompletedTask {
    /// Final observation
    pub record: TaskRecord,

    /// Every observed status step, with the time it was observed
    pub transitions: Vec<Transition<TaskStatus, TaskStatus>>,

    /// Number of status requests issued
    pub polls: u32,
}

/// Handle to a remote task in flight
pub struct TaskHandle<C: ControlPlane + ?Sized> {
    control_plane: Arc<C>,
    record: TaskRecord,
    policy: PollPolicy,
}

impl<C: ControlPlane + ?Sized> TaskHandle<C> {
    /// `policy` must already be validated; handles come from
    /// [`MutationOrchestrator`](crate::orchestrator::MutationOrchestrator).
    pub(crate) fn new(control_plane: Arc<C>, record: TaskRecord, policy: PollPolicy) -> Self {
        Self {
            control_plane,
            record,
            policy,
        }
    }

    pub fn href(&self) -> &str {
        &self.record.href
    }

    /// Last observed status
    pub fn status(&self) -> TaskStatus {
        self.record.status
    }

    pub fn operation(&self) -> &str {
        &self.record.operation
    }

    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Block until the task is terminal, the token fires or the deadline passes
    pub async fn wait(self, cancel: &CancellationToken) -> OrchestrationResult<CompletedTask> {
        self.wait_with_progress(cancel, |_| {}).await
    }

    /// Like [`wait`](Self::wait), calling `on_progress` after every poll
    pub async fn wait_with_progress<F>(
        self,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> OrchestrationResult<CompletedTask>
    where
        F: FnMut(&TaskRecord),
    {
        let TaskHandle {
            control_plane,
            mut record,
            policy,
        } = self;

        let href = record.href.clone();
        let deadline = policy.timeout.map(|timeout| Instant::now() + timeout);
        let mut lifecycle = StateMachineWithHistory::new(record.status);
        let mut interval = policy.first_interval();
        let mut polls = 0u32;
        let mut terminal = record.status.is_terminal();

        while !terminal {
            let observed = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(abandon(&href, AbandonReason::Cancelled));
                }
                _ = deadline_elapsed(deadline) => {
                    return Err(abandon(&href, AbandonReason::DeadlineExceeded));
                }
                result = async {
                    sleep(interval).await;
                    control_plane.get_task(&href).await
                } => result?,
            };
            polls += 1;

            let step = lifecycle.transition_with_history(observed.status, Utc::now())?;
            terminal = step.terminal;
            if step.changed {
                debug!(
                    "Task {} is {} ({}%)",
                    href, observed.status, observed.progress
                );
            }

            record = observed;
            on_progress(&record);
            interval = policy.next_interval(interval);
        }

        finish(record, lifecycle.into_history(), polls)
    }
}

fn abandon(href: &str, reason: AbandonReason) -> OrchestrationError {
    warn!("Abandoning wait on task {}: {}", href, reason);
    OrchestrationError::ContextCancelled {
        task: href.to_string(),
        reason,
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn finish(
    record: TaskRecord,
    transitions: Vec<Transition<TaskStatus, TaskStatus>>,
    polls: u32,
) -> OrchestrationResult<CompletedTask> {
    let (major_error_code, minor_error_code) = record
        .error
        .as_ref()
        .map(|e| (e.major_error_code, e.minor_error_code.clone()))
        .unwrap_or_default();

    match record.status {
        TaskStatus::Success => {
            info!(
                "Task {} ({}) succeeded after {} polls",
                record.href, record.operation, polls
            );
            Ok(CompletedTask {
                record,
                transitions,
                polls,
            })
        }
        TaskStatus::Error => Err(OrchestrationError::TaskFailed {
            message: record.error_message(),
            task: record.href,
            operation: record.operation,
            major_error_code,
            minor_error_code,
        }),
        TaskStatus::Aborted => Err(OrchestrationError::TaskAborted {
            message: record.error_message(),
            task: record.href,
            operation: record.operation,
            major_error_code,
            minor_error_code,
        }),
        TaskStatus::Cancelled => Err(OrchestrationError::TaskCancelled {
            task: record.href,
            operation: record.operation,
        }),
        other => Err(OrchestrationError::Inconsistent(format!(
            "task {} stopped polling in state {}",
            record.href, other
        ))),
    }
}
