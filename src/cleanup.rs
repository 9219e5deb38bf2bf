// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cleanup registration
//!
//! Every resource the orchestrator creates can be reported to a
//! [`CleanupRegistry`]. Registration is fire-and-forget; it never fails the
//! creation. [`CleanupList`] is the in-process registry: it remembers the
//! entries and can delete them again, newest first.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::control_plane::ControlPlane;
use crate::domain::ResourceKind;
use crate::errors::OrchestrationError;
use crate::locator::ResourceLocator;
use crate::orchestrator::MutationOrchestrator;

/// A resource scheduled for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupEntry {
    pub name: String,
    pub kind: ResourceKind,
    /// Owning resource, empty for top-level resources
    pub parent: String,
    /// Why the resource was created (e.g. the test or job name)
    pub reason: String,
}

/// Receiver of created-resource notifications
pub trait CleanupRegistry: Send + Sync {
    fn register(&self, entry: CleanupEntry);
}

/// Result of a teardown pass
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub removed: Vec<CleanupEntry>,
    /// Entries whose resource was already gone
    pub missing: Vec<CleanupEntry>,
    pub failed: Vec<(CleanupEntry, OrchestrationError)>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// In-process cleanup registry
#[derive(Debug, Default)]
pub struct CleanupList {
    entries: Mutex<Vec<CleanupEntry>>,
}

impl CleanupList {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CleanupEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registered entries in registration order
    pub fn entries(&self) -> Vec<CleanupEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return all entries
    pub fn drain(&self) -> Vec<CleanupEntry> {
        std::mem::take(&mut *self.lock())
    }

    /// Delete every registered resource, newest first
    ///
    /// Failures are collected and do not stop the pass.
    pub async fn teardown<C: ControlPlane + ?Sized>(
        &self,
        orchestrator: &MutationOrchestrator<C>,
        cancel: &CancellationToken,
    ) -> TeardownReport {
        let locator = ResourceLocator::new(orchestrator.control_plane().clone());
        let mut report = TeardownReport::default();

        for entry in self.drain().into_iter().rev() {
            let reference = match locator.locate(entry.kind, &entry.name).await {
                Ok(Some(reference)) => reference,
                Ok(None) => {
                    debug!("Cleanup: {} '{}' already gone", entry.kind, entry.name);
                    report.missing.push(entry);
                    continue;
                }
                Err(e) => {
                    warn!("Cleanup: failed to locate '{}': {}", entry.name, e);
                    report.failed.push((entry, e));
                    continue;
                }
            };

            match orchestrator.delete_and_wait(&reference, cancel).await {
                Ok(_) => {
                    info!("Cleanup: removed {} '{}'", entry.kind, entry.name);
                    report.removed.push(entry);
                }
                Err(e) if e.is_not_found() => report.missing.push(entry),
                Err(e) => {
                    warn!("Cleanup: failed to remove '{}': {}", entry.name, e);
                    report.failed.push((entry, e));
                }
            }
        }

        report
    }
}

impl CleanupRegistry for CleanupList {
    fn register(&self, entry: CleanupEntry) {
        debug!("Registered {} '{}' for cleanup", entry.kind, entry.name);
        self.lock().push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> CleanupEntry {
        CleanupEntry {
            name: name.to_string(),
            kind: ResourceKind::ExternalNetwork,
            parent: String::new(),
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_register_and_drain() {
        let list = CleanupList::new();
        list.register(entry("net-A"));
        list.register(entry("net-B"));

        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].name, "net-A");

        let drained = list.drain();
        assert_eq!(drained.len(), 2);
        assert!(list.is_empty());
    }
}
