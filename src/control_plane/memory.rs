// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory control plane
//!
//! Simulates the remote side closely enough to drive the full
//! create → poll → verify workflow without a server:
//!
//! - mutations answer with a queued task; the mutation is applied only when
//!   a poll moves that task to `success`
//! - each `get_task` advances the task by one step of its [`TaskScript`]
//! - every request is recorded so tests can assert on what was sent
//! - faults can be injected: rejected mutations, failing scripts, dropped
//!   effects (task succeeds but nothing changes), duplicate names

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

use super::ControlPlane;
use crate::domain::{
    ExternalNetworkDefinition, ResourceKind, ResourceReference, TaskErrorDetail, TaskRecord,
    TaskStatus,
};
use crate::errors::{OrchestrationError, OrchestrationResult};
use crate::query::{QueryFacade, QueryFilter, QueryRecord};

/// A request received by the simulated control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    Query {
        resource_type: String,
        filter: String,
    },
    CreateExternalNetwork {
        name: String,
    },
    Delete {
        href: String,
    },
    GetTask {
        href: String,
    },
    GetExternalNetwork {
        href: String,
    },
}

impl RecordedRequest {
    /// Requests that change remote state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RecordedRequest::CreateExternalNetwork { .. } | RecordedRequest::Delete { .. }
        )
    }
}

/// Statuses a simulated task reports on successive polls
///
/// Once the script is exhausted the task keeps its last status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskScript {
    statuses: Vec<TaskStatus>,
    error: Option<TaskErrorDetail>,
}

impl Default for TaskScript {
    fn default() -> Self {
        Self::succeeds_after(2)
    }
}

impl TaskScript {
    pub fn new(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
            error: None,
        }
    }

    /// Reports `running` until the `polls`-th poll, which reports `success`
    pub fn succeeds_after(polls: usize) -> Self {
        let mut statuses = vec![TaskStatus::Running; polls.saturating_sub(1)];
        statuses.push(TaskStatus::Success);
        Self::new(statuses)
    }

    /// Runs once, then ends in `status` with the given message
    pub fn ends_with(status: TaskStatus, message: impl Into<String>) -> Self {
        Self::new([TaskStatus::Running, status]).with_error(TaskErrorDetail {
            message: message.into(),
            major_error_code: 400,
            minor_error_code: "BAD_REQUEST".to_string(),
        })
    }

    /// Reports `running` forever
    pub fn never_completes() -> Self {
        Self::new([TaskStatus::Running])
    }

    pub fn with_error(mut self, error: TaskErrorDetail) -> Self {
        self.error = Some(error);
        self
    }
}

enum TaskEffect {
    CreateNetwork(ExternalNetworkDefinition),
    DeleteNetwork(String),
}

struct SimTask {
    record: TaskRecord,
    remaining: VecDeque<TaskStatus>,
    error: Option<TaskErrorDetail>,
    effect: Option<TaskEffect>,
}

#[derive(Default)]
struct SimState {
    networks: Vec<ExternalNetworkDefinition>,
    virtual_centers: Vec<QueryRecord>,
    tasks: HashMap<String, SimTask>,
    requests: Vec<RecordedRequest>,
    default_script: TaskScript,
    next_scripts: VecDeque<TaskScript>,
    rejections: VecDeque<(u16, String)>,
    drop_next_effect: bool,
}

/// Simulated control plane holding all state in memory
pub struct InMemoryControlPlane {
    base_url: String,
    state: Mutex<SimState>,
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::with_base_url("https://vcd.simulated")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            state: Mutex::new(SimState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a virtual center the query service will report
    pub fn seed_virtual_center(&self, name: &str) -> ResourceReference {
        let href = format!(
            "{}/api/admin/extension/vimServer/{}",
            self.base_url,
            Uuid::now_v7()
        );
        let record = QueryRecord::new(name, href)
            .with_attribute("isEnabled", serde_json::Value::Bool(true));
        let reference = record.to_reference(ResourceKind::VirtualCenter);
        self.state().virtual_centers.push(record);
        reference
    }

    /// Insert an existing network directly, bypassing name conflict checks
    pub fn seed_external_network(&self, definition: ExternalNetworkDefinition) -> ResourceReference {
        let href = self.network_href();
        let mut stored = definition;
        stored.href = Some(href.clone());
        let reference = ResourceReference::new(
            stored.name.clone(),
            href,
            ResourceKind::ExternalNetwork.media_type(),
        );
        self.state().networks.push(stored);
        reference
    }

    /// Script used by every task without a one-shot script
    pub fn set_default_script(&self, script: TaskScript) {
        self.state().default_script = script;
    }

    /// Script for the next task only (queued in call order)
    pub fn script_next_task(&self, script: TaskScript) {
        self.state().next_scripts.push_back(script);
    }

    /// Reject the next create or delete request
    pub fn reject_next_mutation(&self, status: u16, message: impl Into<String>) {
        self.state().rejections.push_back((status, message.into()));
    }

    /// Let the next task succeed without applying its change
    pub fn drop_next_effect(&self) {
        self.state().drop_next_effect = true;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    pub fn external_networks(&self) -> Vec<ExternalNetworkDefinition> {
        self.state().networks.clone()
    }

    pub fn external_networks_named(&self, name: &str) -> Vec<ExternalNetworkDefinition> {
        self.state()
            .networks
            .iter()
            .filter(|n| n.name == name)
            .cloned()
            .collect()
    }

    fn network_href(&self) -> String {
        format!(
            "{}/api/admin/extension/externalnet/{}",
            self.base_url,
            Uuid::now_v7()
        )
    }

    fn start_task(
        &self,
        state: &mut SimState,
        operation_name: &str,
        operation: String,
        effect: TaskEffect,
    ) -> TaskRecord {
        let script = state
            .next_scripts
            .pop_front()
            .unwrap_or_else(|| state.default_script.clone());

        let href = format!("{}/api/task/{}", self.base_url, Uuid::now_v7());
        let mut record = TaskRecord::new(href.clone(), operation_name, TaskStatus::Queued);
        record.operation = operation;
        record.start_time = Some(Utc::now());

        state.tasks.insert(
            href,
            SimTask {
                record: record.clone(),
                remaining: script.statuses.into(),
                error: script.error,
                effect: Some(effect),
            },
        );
        record
    }

    fn run_query(&self, resource_type: &str, filter: &str) -> OrchestrationResult<Vec<QueryRecord>> {
        let mut state = self.state();
        state.requests.push(RecordedRequest::Query {
            resource_type: resource_type.to_string(),
            filter: filter.to_string(),
        });

        let filter: QueryFilter = filter.parse().map_err(|e: crate::query::QueryFilterError| {
            OrchestrationError::RequestRejected {
                status: 400,
                message: e.to_string(),
            }
        })?;

        let records: Vec<QueryRecord> = match resource_type {
            "externalNetwork" => state
                .networks
                .iter()
                .map(|n| QueryRecord::new(n.name.clone(), n.href.clone().unwrap_or_default()))
                .collect(),
            "virtualCenter" => state.virtual_centers.clone(),
            other => {
                return Err(OrchestrationError::RequestRejected {
                    status: 400,
                    message: format!("Unknown query type: {}", other),
                })
            }
        };

        Ok(records
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    fn create_network(
        &self,
        definition: &ExternalNetworkDefinition,
    ) -> OrchestrationResult<TaskRecord> {
        let mut state = self.state();
        state.requests.push(RecordedRequest::CreateExternalNetwork {
            name: definition.name.clone(),
        });

        if let Some((status, message)) = state.rejections.pop_front() {
            return Err(OrchestrationError::RequestRejected { status, message });
        }
        if state.networks.iter().any(|n| n.name == definition.name) {
            return Err(OrchestrationError::RequestRejected {
                status: 400,
                message: format!("External network '{}' already exists", definition.name),
            });
        }

        let mut stored = definition.clone();
        stored.href = Some(self.network_href());
        let operation = format!("Creating External Network {}", definition.name);
        Ok(self.start_task(
            &mut state,
            "externalNetworkCreate",
            operation,
            TaskEffect::CreateNetwork(stored),
        ))
    }

    fn delete(&self, href: &str) -> OrchestrationResult<TaskRecord> {
        let mut state = self.state();
        state.requests.push(RecordedRequest::Delete {
            href: href.to_string(),
        });

        if let Some((status, message)) = state.rejections.pop_front() {
            return Err(OrchestrationError::RequestRejected { status, message });
        }
        let name = state
            .networks
            .iter()
            .find(|n| n.href.as_deref() == Some(href))
            .map(|n| n.name.clone())
            .ok_or_else(|| OrchestrationError::NotFound(href.to_string()))?;

        let operation = format!("Deleting External Network {}", name);
        Ok(self.start_task(
            &mut state,
            "externalNetworkDelete",
            operation,
            TaskEffect::DeleteNetwork(href.to_string()),
        ))
    }

    fn poll_task(&self, href: &str) -> OrchestrationResult<TaskRecord> {
        let mut state = self.state();
        state.requests.push(RecordedRequest::GetTask {
            href: href.to_string(),
        });

        let (record, effect) = {
            let task = state
                .tasks
                .get_mut(href)
                .ok_or_else(|| OrchestrationError::NotFound(href.to_string()))?;

            let mut effect = None;
            if !task.record.status.is_terminal() {
                if let Some(next) = task.remaining.pop_front() {
                    task.record.status = next;
                    if next.is_terminal() {
                        task.record.progress = 100;
                        task.record.end_time = Some(Utc::now());
                        if next == TaskStatus::Success {
                            effect = task.effect.take();
                        } else {
                            task.record.error = Some(task.error.clone().unwrap_or_default());
                        }
                    } else {
                        task.record.progress = (task.record.progress + 25).min(90);
                    }
                }
            }
            (task.record.clone(), effect)
        };

        if let Some(effect) = effect {
            if state.drop_next_effect {
                debug!("Simulated task {} succeeded without applying its change", href);
                state.drop_next_effect = false;
            } else {
                match effect {
                    TaskEffect::CreateNetwork(definition) => state.networks.push(definition),
                    TaskEffect::DeleteNetwork(target) => state
                        .networks
                        .retain(|n| n.href.as_deref() != Some(target.as_str())),
                }
            }
        }

        Ok(record)
    }

    fn fetch_network(&self, href: &str) -> OrchestrationResult<ExternalNetworkDefinition> {
        let mut state = self.state();
        state.requests.push(RecordedRequest::GetExternalNetwork {
            href: href.to_string(),
        });
        state
            .networks
            .iter()
            .find(|n| n.href.as_deref() == Some(href))
            .cloned()
            .ok_or_else(|| OrchestrationError::NotFound(href.to_string()))
    }
}

#[async_trait]
impl QueryFacade for InMemoryControlPlane {
    async fn query(
        &self,
        resource_type: &str,
        filter: &str,
    ) -> OrchestrationResult<Vec<QueryRecord>> {
        self.run_query(resource_type, filter)
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn create_external_network(
        &self,
        definition: &ExternalNetworkDefinition,
    ) -> OrchestrationResult<TaskRecord> {
        self.create_network(definition)
    }

    async fn delete_resource(&self, href: &str) -> OrchestrationResult<TaskRecord> {
        self.delete(href)
    }

    async fn get_task(&self, href: &str) -> OrchestrationResult<TaskRecord> {
        self.poll_task(href)
    }

    async fn get_external_network(
        &self,
        href: &str,
    ) -> OrchestrationResult<ExternalNetworkDefinition> {
        self.fetch_network(href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FenceMode, IpScope, NetworkSpec, PortGroupBinding, VimObjectType};

    fn definition(name: &str, vc: &ResourceReference) -> ExternalNetworkDefinition {
        NetworkSpec {
            description: String::new(),
            ip_scope: IpScope::new("10.0.0.1", "255.255.255.0").range("10.0.0.10", "10.0.0.20"),
            fence_mode: FenceMode::Isolated,
            port_group: PortGroupBinding {
                vim_server: "vc1".to_string(),
                mo_ref: "dvportgroup-1".to_string(),
                object_type: VimObjectType::DvPortgroup,
            },
        }
        .to_definition(name, vc)
    }

    #[tokio::test]
    async fn test_create_applies_only_on_success() {
        let sim = InMemoryControlPlane::new();
        let vc = sim.seed_virtual_center("vc1");

        let task = sim
            .create_external_network(&definition("net-A", &vc))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Queued);
        assert!(sim.external_networks().is_empty());

        let first = sim.get_task(&task.href).await.unwrap();
        assert_eq!(first.status, TaskStatus::Running);
        assert!(sim.external_networks().is_empty());

        let second = sim.get_task(&task.href).await.unwrap();
        assert_eq!(second.status, TaskStatus::Success);
        assert_eq!(second.progress, 100);
        assert_eq!(sim.external_networks_named("net-A").len(), 1);

        // Exhausted scripts keep their terminal status
        let third = sim.get_task(&task.href).await.unwrap();
        assert_eq!(third.status, TaskStatus::Success);
        assert_eq!(sim.external_networks().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_script_attaches_error() {
        let sim = InMemoryControlPlane::new();
        let vc = sim.seed_virtual_center("vc1");
        sim.script_next_task(TaskScript::ends_with(TaskStatus::Error, "no capacity"));

        let task = sim
            .create_external_network(&definition("net-A", &vc))
            .await
            .unwrap();
        sim.get_task(&task.href).await.unwrap();
        let done = sim.get_task(&task.href).await.unwrap();

        assert_eq!(done.status, TaskStatus::Error);
        assert_eq!(done.error_message(), "no capacity");
        assert!(sim.external_networks().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let sim = InMemoryControlPlane::new();
        let vc = sim.seed_virtual_center("vc1");
        sim.seed_external_network(definition("net-A", &vc));

        let result = sim.create_external_network(&definition("net-A", &vc)).await;
        assert!(matches!(
            result,
            Err(OrchestrationError::RequestRejected { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_query_filters_by_name() {
        let sim = InMemoryControlPlane::new();
        sim.seed_virtual_center("vc1");
        sim.seed_virtual_center("vc2");

        let records = sim.query("virtualCenter", "(name==vc2)").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "vc2");

        let unknown = sim.query("edgeGateway", "(name==vc2)").await;
        assert!(matches!(
            unknown,
            Err(OrchestrationError::RequestRejected { .. })
        ));
        assert_eq!(sim.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_href() {
        let sim = InMemoryControlPlane::new();
        let result = sim.delete_resource("https://vcd.simulated/api/nothing").await;
        assert!(matches!(result, Err(OrchestrationError::NotFound(_))));
    }
}
