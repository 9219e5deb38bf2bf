// Copyright (c) 2025 - Cowboy AI, Inc.
//! Control Plane Transport
//!
//! The remote control plane is reached through the [`ControlPlane`] trait.
//! Every mutation is accepted immediately and answered with a task record;
//! the mutation itself happens later, server side.
//!
//! ```text
//! create_external_network ──► TaskRecord (queued)
//!                                  │ get_task (poll)
//!                                  ▼
//!                             TaskRecord (success | error | aborted | canceled)
//! ```
//!
//! # Implementations
//!
//! - [`HttpControlPlane`] - REST/JSON over `reqwest` (feature `http`)
//! - [`InMemoryControlPlane`] - scripted simulation for tests and dry runs
//!
//! Implementations must be safe to share between concurrently waiting task
//! handles and locator calls.

#[cfg(feature = "http")]
pub mod http;
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpControlPlane;
pub use memory::{InMemoryControlPlane, RecordedRequest, TaskScript};

use async_trait::async_trait;

use crate::domain::{ExternalNetworkDefinition, TaskRecord};
use crate::errors::OrchestrationResult;
use crate::query::QueryFacade;

/// Authenticated channel to the remote control plane
#[async_trait]
pub trait ControlPlane: QueryFacade {
    /// Request creation of an external network
    ///
    /// # Returns
    /// - The task tracking the creation
    async fn create_external_network(
        &self,
        definition: &ExternalNetworkDefinition,
    ) -> OrchestrationResult<TaskRecord>;

    /// Request deletion of the resource at `href`
    async fn delete_resource(&self, href: &str) -> OrchestrationResult<TaskRecord>;

    /// Fetch the current state of a task
    async fn get_task(&self, href: &str) -> OrchestrationResult<TaskRecord>;

    /// Fetch the definition of an existing external network
    async fn get_external_network(&self, href: &str)
        -> OrchestrationResult<ExternalNetworkDefinition>;
}
