// Copyright (c) 2025 - Cowboy AI, Inc.
//! Task-tracked reconciliation of external networks on a cloud control plane
//!
//! The control plane accepts mutations immediately and completes them
//! asynchronously, reporting progress through server-side tasks. This crate
//! locates resources by name, issues create/delete mutations, waits on their
//! tasks with a cancellable poll loop, and reconciles an external network to
//! a desired configuration.
//!
//! # Components
//!
//! - [`locator::ResourceLocator`] - name → at most one reference
//! - [`orchestrator::MutationOrchestrator`] - create / delete-and-wait
//! - [`task::TaskHandle`] - poll a remote task to a terminal state
//! - [`reconciler::NetworkReconciler`] - ensure exactly one network with a desired configuration
//! - [`control_plane`] - the transport: HTTP or in-memory simulation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cim_infrastructure_vcd::{ControlPlaneConfig, HttpControlPlane, NetworkReconciler};
//! # use cim_infrastructure_vcd::domain::NetworkSpec;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(spec: NetworkSpec) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ControlPlaneConfig::from_env()?;
//! let policy = config.poll_policy()?;
//! let reconciler = NetworkReconciler::new(Arc::new(HttpControlPlane::new(config)?), policy)?;
//!
//! let outcome = reconciler
//!     .ensure_network("net-A", &spec, &CancellationToken::new())
//!     .await?;
//! println!("{} {:?}", outcome.reference.href, outcome.action);
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod config;
pub mod control_plane;
pub mod domain;
pub mod errors;
pub mod locator;
pub mod orchestrator;
pub mod query;
pub mod reconciler;
pub mod state_machine;
pub mod task;

// Re-export commonly used types
pub use cleanup::{CleanupEntry, CleanupList, CleanupRegistry, TeardownReport};
pub use config::{ControlPlaneConfig, PollPolicy};
#[cfg(feature = "http")]
pub use control_plane::HttpControlPlane;
pub use control_plane::{ControlPlane, InMemoryControlPlane};
pub use errors::{AbandonReason, OrchestrationError, OrchestrationResult};
pub use locator::ResourceLocator;
pub use orchestrator::MutationOrchestrator;
pub use query::{QueryFacade, QueryFilter, QueryRecord};
pub use reconciler::{NetworkReconciler, ReconcileAction, ReconcileOutcome, RecreatePolicy};
pub use task::{CompletedTask, TaskHandle};
