// Copyright (c) 2025 - Cowboy AI, Inc.
//! Mutation orchestration
//!
//! Sends create and delete requests and turns the task the remote answers
//! with into a [`TaskHandle`]. Creation returns as soon as the request is
//! accepted; deletion waits for its task in the same call.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cleanup::{CleanupEntry, CleanupRegistry};
use crate::config::PollPolicy;
use crate::control_plane::ControlPlane;
use crate::domain::{ExternalNetworkDefinition, ResourceKind, ResourceReference, TaskRecord};
use crate::errors::{OrchestrationError, OrchestrationResult};
use crate::task::{CompletedTask, TaskHandle};

/// Issues mutations against the control plane
pub struct MutationOrchestrator<C: ControlPlane + ?Sized> {
    control_plane: Arc<C>,
    policy: PollPolicy,
    cleanup: Option<(Arc<dyn CleanupRegistry>, String)>,
}

impl<C: ControlPlane + ?Sized> MutationOrchestrator<C> {
    /// # Errors
    ///
    /// `Configuration` when `policy` would poll without delay or shrink its
    /// interval.
    pub fn new(control_plane: Arc<C>, policy: PollPolicy) -> OrchestrationResult<Self> {
        Ok(Self {
            control_plane,
            policy: policy.validate()?,
            cleanup: None,
        })
    }

    /// Register every created resource with `registry`, tagged with `reason`
    pub fn with_cleanup_registry(
        mut self,
        registry: Arc<dyn CleanupRegistry>,
        reason: impl Into<String>,
    ) -> Self {
        self.cleanup = Some((registry, reason.into()));
        self
    }

    /// Poll policy given to every handle this orchestrator produces
    pub fn wait_policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn control_plane(&self) -> &Arc<C> {
        &self.control_plane
    }

    /// Wrap an already issued task
    pub fn track(&self, record: TaskRecord) -> TaskHandle<C> {
        TaskHandle::new(Arc::clone(&self.control_plane), record, self.policy)
    }

    /// Request creation of an external network
    ///
    /// Fails only if the definition is invalid or the request is rejected;
    /// the returned handle may still be queued.
    pub async fn create(
        &self,
        definition: &ExternalNetworkDefinition,
    ) -> OrchestrationResult<TaskHandle<C>> {
        definition.validate()?;

        let record = self
            .control_plane
            .create_external_network(definition)
            .await?;
        info!(
            "Create of external network '{}' accepted as task {}",
            definition.name, record.href
        );

        if let Some((registry, reason)) = &self.cleanup {
            registry.register(CleanupEntry {
                name: definition.name.clone(),
                kind: ResourceKind::ExternalNetwork,
                parent: String::new(),
                reason: reason.clone(),
            });
        }

        Ok(self.track(record))
    }

    /// Delete the referenced resource and wait for the deletion task
    pub async fn delete_and_wait(
        &self,
        reference: &ResourceReference,
        cancel: &CancellationToken,
    ) -> OrchestrationResult<CompletedTask> {
        if !reference.is_addressable() {
            return Err(OrchestrationError::NotFound(format!(
                "'{}' has no href",
                reference.name
            )));
        }

        debug!("Deleting '{}' at {}", reference.name, reference.href);
        let record = self.control_plane.delete_resource(&reference.href).await?;
        self.track(record).wait(cancel).await
    }
}
