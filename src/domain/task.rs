// Copyright (c) 2025 - Cowboy AI, Inc.
//! Remote task records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a remote task as reported by the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Queued,
    PreRunning,
    Running,
    Success,
    Error,
    Aborted,
    #[serde(rename = "canceled", alias = "cancelled")]
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 7] = [
        TaskStatus::Queued,
        TaskStatus::PreRunning,
        TaskStatus::Running,
        TaskStatus::Success,
        TaskStatus::Error,
        TaskStatus::Aborted,
        TaskStatus::Cancelled,
    ];

    /// Terminal states never change again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Success | TaskStatus::Error | TaskStatus::Aborted | TaskStatus::Cancelled
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::PreRunning => "preRunning",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
            TaskStatus::Aborted => "aborted",
            TaskStatus::Cancelled => "canceled",
        };
        f.write_str(s)
    }
}

/// Error detail attached to a failed task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub major_error_code: i32,
    #[serde(default)]
    pub minor_error_code: String,
}

/// One observation of a remote task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub href: String,

    #[serde(default)]
    pub name: String,

    /// Human readable description, e.g. "Created External Network net-A"
    #[serde(default)]
    pub operation: String,

    /// Machine name of the operation, e.g. "externalNetworkCreate"
    #[serde(default)]
    pub operation_name: String,

    pub status: TaskStatus,

    #[serde(default)]
    pub progress: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskErrorDetail>,
}

impl TaskRecord {
    pub fn new(
        href: impl Into<String>,
        operation_name: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        let operation_name = operation_name.into();
        Self {
            href: href.into(),
            name: "task".to_string(),
            operation: operation_name.clone(),
            operation_name,
            status,
            progress: 0,
            start_time: None,
            end_time: None,
            error: None,
        }
    }

    /// Remote error message, or a placeholder when the remote sent none
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("task ended in state {}", self.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::PreRunning).unwrap(),
            "\"preRunning\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Cancelled).unwrap(),
            "\"canceled\""
        );
        let alias: TaskStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(alias, TaskStatus::Cancelled);
    }

    #[test]
    fn test_task_record_from_remote_json() {
        let record: TaskRecord = serde_json::from_value(serde_json::json!({
            "href": "https://vcd/api/task/7",
            "name": "task",
            "operation": "Created External Network net-A",
            "operationName": "externalNetworkCreate",
            "status": "error",
            "progress": 100,
            "startTime": "2026-01-19T12:00:00Z",
            "error": {
                "message": "Port group is already in use",
                "majorErrorCode": 400,
                "minorErrorCode": "BAD_REQUEST"
            }
        }))
        .unwrap();

        assert_eq!(record.status, TaskStatus::Error);
        assert!(record.start_time.is_some());
        assert_eq!(record.error_message(), "Port group is already in use");
    }

    #[test]
    fn test_error_message_placeholder() {
        let record = TaskRecord::new("t", "externalNetworkDelete", TaskStatus::Aborted);
        assert_eq!(record.error_message(), "task ended in state aborted");
    }
}
