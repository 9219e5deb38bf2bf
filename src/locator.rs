// Copyright (c) 2025 - Cowboy AI, Inc.
//! Name-based resource lookup
//!
//! Resolves a resource name to at most one [`ResourceReference`] through the
//! query service. Absence is `Ok(None)`, never an error.

use std::sync::Arc;
use tracing::debug;

use crate::domain::{ResourceKind, ResourceReference};
use crate::errors::{OrchestrationError, OrchestrationResult};
use crate::query::{QueryFacade, QueryFilter, RESERVED_FILTER_CHARS};

/// Read-only lookup of resources by name
pub struct ResourceLocator<Q: QueryFacade + ?Sized> {
    query: Arc<Q>,
}

impl<Q: QueryFacade + ?Sized> Clone for ResourceLocator<Q> {
    fn clone(&self) -> Self {
        Self {
            query: Arc::clone(&self.query),
        }
    }
}

impl<Q: QueryFacade + ?Sized> ResourceLocator<Q> {
    pub fn new(query: Arc<Q>) -> Self {
        Self { query }
    }

    /// Find the unique resource of `kind` named exactly `name`
    ///
    /// # Errors
    ///
    /// `InvalidName` when `name` contains a character reserved in query
    /// filters; nothing is sent in that case.
    ///
    /// `AmbiguousResult` when more than one record carries the name.
    pub async fn locate(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> OrchestrationResult<Option<ResourceReference>> {
        debug_assert!(!name.is_empty(), "resource name must not be empty");
        if name.contains(&RESERVED_FILTER_CHARS[..]) {
            return Err(OrchestrationError::InvalidName(name.to_string()));
        }

        let filter = QueryFilter::eq("name", name);
        let records = self
            .query
            .query(kind.query_type(), &filter.to_string())
            .await?;

        let mut matches: Vec<_> = records.into_iter().filter(|r| r.name == name).collect();
        debug!("Located {} {} record(s) named '{}'", matches.len(), kind, name);

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop().map(|record| record.to_reference(kind))),
            count => Err(OrchestrationError::AmbiguousResult {
                kind: kind.to_string(),
                name: name.to_string(),
                count,
            }),
        }
    }

    pub async fn locate_external_network(
        &self,
        name: &str,
    ) -> OrchestrationResult<Option<ResourceReference>> {
        self.locate(ResourceKind::ExternalNetwork, name).await
    }

    pub async fn locate_virtual_center(
        &self,
        name: &str,
    ) -> OrchestrationResult<Option<ResourceReference>> {
        self.locate(ResourceKind::VirtualCenter, name).await
    }
}
