// Copyright (c) 2025 - Cowboy AI, Inc.
//! External network reconciliation
//!
//! Drives the remote side toward "exactly one external network named N with
//! the desired configuration":
//!
//! ```text
//! locate(N) ─► resolve virtual center ─► build definition
//!      │                                      │
//!      ├─ absent ─────────────────────────────┼─► create ─► wait ─► locate(N)
//!      └─ present ─► recreate policy ─► delete ─► wait ─► locate(N) ─┘
//!                          └─ converged ─► Unchanged
//! ```
//!
//! The virtual center is resolved before anything is deleted, so a missing
//! dependency never leaves the network removed.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::PollPolicy;
use crate::control_plane::ControlPlane;
use crate::domain::{NetworkSpec, ResourceReference};
use crate::errors::{OrchestrationError, OrchestrationResult};
use crate::locator::ResourceLocator;
use crate::orchestrator::MutationOrchestrator;

/// What to do when the network already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecreatePolicy {
    /// Delete and recreate unconditionally
    #[default]
    AlwaysRecreate,
    /// Keep the network when its definition already matches
    RecreateIfDifferent,
}

impl std::str::FromStr for RecreatePolicy {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "always-recreate" => Ok(RecreatePolicy::AlwaysRecreate),
            "if-different" | "recreate-if-different" => Ok(RecreatePolicy::RecreateIfDifferent),
            other => Err(OrchestrationError::Configuration(format!(
                "unknown recreate policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Created,
    Recreated,
    Unchanged,
}

/// Result of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// The network as located after reconciliation
    pub reference: ResourceReference,
    pub action: ReconcileAction,
}

/// Ensures external networks exist with a desired configuration
pub struct NetworkReconciler<C: ControlPlane + ?Sized> {
    locator: ResourceLocator<C>,
    orchestrator: MutationOrchestrator<C>,
    policy: RecreatePolicy,
}

impl<C: ControlPlane + ?Sized> NetworkReconciler<C> {
    /// Fails with `Configuration` when `poll` is not a valid policy
    pub fn new(control_plane: Arc<C>, poll: PollPolicy) -> OrchestrationResult<Self> {
        Ok(Self::from_parts(
            ResourceLocator::new(Arc::clone(&control_plane)),
            MutationOrchestrator::new(control_plane, poll)?,
        ))
    }

    pub fn from_parts(locator: ResourceLocator<C>, orchestrator: MutationOrchestrator<C>) -> Self {
        Self {
            locator,
            orchestrator,
            policy: RecreatePolicy::default(),
        }
    }

    pub fn with_recreate_policy(mut self, policy: RecreatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn recreate_policy(&self) -> RecreatePolicy {
        self.policy
    }

    pub fn orchestrator(&self) -> &MutationOrchestrator<C> {
        &self.orchestrator
    }

    /// Make sure exactly one network named `name` exists, configured per `spec`
    pub async fn ensure_network(
        &self,
        name: &str,
        spec: &NetworkSpec,
        cancel: &CancellationToken,
    ) -> OrchestrationResult<ReconcileOutcome> {
        let existing = self.locator.locate_external_network(name).await?;

        let vim_server = self
            .locator
            .locate_virtual_center(&spec.port_group.vim_server)
            .await?
            .ok_or_else(|| {
                OrchestrationError::PreconditionFailed(format!(
                    "virtual center '{}' required by network '{}' not found",
                    spec.port_group.vim_server, name
                ))
            })?;

        let desired = spec.to_definition(name, &vim_server);
        desired.validate()?;

        let action = match existing {
            None => ReconcileAction::Created,
            Some(current) => {
                if self.policy == RecreatePolicy::RecreateIfDifferent {
                    let actual = self
                        .orchestrator
                        .control_plane()
                        .get_external_network(&current.href)
                        .await?;
                    if desired.converges_with(&actual) {
                        info!("External network '{}' already matches, leaving it", name);
                        return Ok(ReconcileOutcome {
                            reference: current,
                            action: ReconcileAction::Unchanged,
                        });
                    }
                    debug!("External network '{}' differs from the desired definition", name);
                }

                info!("Deleting existing external network '{}'", name);
                self.orchestrator.delete_and_wait(&current, cancel).await?;

                if self.locator.locate_external_network(name).await?.is_some() {
                    return Err(OrchestrationError::Inconsistent(format!(
                        "external network '{}' still present after successful delete",
                        name
                    )));
                }
                ReconcileAction::Recreated
            }
        };

        info!("Creating external network '{}'", name);
        self.orchestrator.create(&desired).await?.wait(cancel).await?;

        let reference = self
            .locator
            .locate_external_network(name)
            .await?
            .ok_or_else(|| {
                OrchestrationError::Inconsistent(format!(
                    "external network '{}' not found after successful create",
                    name
                ))
            })?;

        info!("External network '{}' reconciled ({:?})", name, action);
        Ok(ReconcileOutcome { reference, action })
    }
}
