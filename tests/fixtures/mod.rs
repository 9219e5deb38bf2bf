// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-infrastructure-vcd
//!
//! Provides a seeded simulated control plane and deterministic network
//! configurations.
//!
//! # Design Principles
//! - Network specs start from fixtures; tests only tweak copies
//! - Poll policies use whole seconds so paused-clock timelines are exact
//! - Every integration test gets its own simulator (no shared state)

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use cim_infrastructure_vcd::domain::{
    ExternalNetworkDefinition, FenceMode, IpScope, NetworkSpec, PortGroupBinding,
    ResourceReference, TaskRecord, TaskStatus, VimObjectType,
};
use cim_infrastructure_vcd::{InMemoryControlPlane, PollPolicy};

pub const VIM_SERVER: &str = "vc1";
pub const PORT_GROUP: &str = "dvportgroup-101";
pub const NETWORK_NAME: &str = "net-A";

/// Poll at 1s, 2s, 4s, 4s, ...
pub fn poll_policy() -> PollPolicy {
    PollPolicy {
        min_interval: Duration::from_secs(1),
        max_interval: Duration::from_secs(4),
        multiplier: 2.0,
        timeout: None,
    }
}

/// The configuration reconciled in most tests
pub fn network_spec() -> NetworkSpec {
    NetworkSpec {
        description: "External network for integration tests".to_string(),
        ip_scope: IpScope::new("192.168.201.1", "255.255.255.0")
            .dns("192.168.202.253")
            .dns("192.168.202.254")
            .dns_suffix("example.com")
            .range("192.168.201.3", "192.168.201.250"),
        fence_mode: FenceMode::Isolated,
        port_group: PortGroupBinding {
            vim_server: VIM_SERVER.to_string(),
            mo_ref: PORT_GROUP.to_string(),
            object_type: VimObjectType::DvPortgroup,
        },
    }
}

/// Same port group, different addressing
pub fn previous_spec() -> NetworkSpec {
    NetworkSpec {
        description: "Stale configuration".to_string(),
        ip_scope: IpScope::new("10.20.0.1", "255.255.0.0").range("10.20.1.1", "10.20.1.99"),
        ..network_spec()
    }
}

/// Simulated control plane with one virtual center
pub struct Lab {
    pub control_plane: Arc<InMemoryControlPlane>,
    pub vim_server: ResourceReference,
}

impl Lab {
    pub fn new() -> Self {
        let control_plane = Arc::new(InMemoryControlPlane::new());
        let vim_server = control_plane.seed_virtual_center(VIM_SERVER);
        Self {
            control_plane,
            vim_server,
        }
    }

    /// Lab whose query service knows no virtual center
    pub fn without_virtual_center() -> Self {
        Self {
            control_plane: Arc::new(InMemoryControlPlane::new()),
            vim_server: ResourceReference::default(),
        }
    }

    pub fn definition(&self, name: &str, spec: &NetworkSpec) -> ExternalNetworkDefinition {
        spec.to_definition(name, &self.vim_server)
    }

    /// Put a network on the remote side without going through a task
    pub fn seed_network(&self, name: &str, spec: &NetworkSpec) -> ResourceReference {
        self.control_plane
            .seed_external_network(self.definition(name, spec))
    }

    /// A task that the simulator has never issued
    pub fn unknown_task(&self) -> TaskRecord {
        TaskRecord::new(
            "https://vcd.simulated/api/task/unknown",
            "externalNetworkCreate",
            TaskStatus::Queued,
        )
    }
}
