// Copyright (c) 2025 - Cowboy AI, Inc.
//! Control Plane Domain Models
//!
//! Value types exchanged with the remote control plane.
//!
//! # References
//!
//! - [`ResourceReference`] - name, opaque href and media type of a remote resource
//! - [`ResourceKind`] - the resource types this crate queries
//!
//! # Tasks
//!
//! - [`TaskStatus`] - remote task states (in flight / terminal)
//! - [`TaskRecord`] - one observation of a remote task
//!
//! # External Networks
//!
//! - [`ExternalNetworkDefinition`] - the creation payload, with validation invariants
//! - [`NetworkSpec`] - desired configuration before the virtual center is resolved

pub mod network;
pub mod reference;
pub mod task;

pub use network::{
    ExternalNetworkDefinition, FenceMode, IpRange, IpRanges, IpScope, IpScopes, NetworkConfiguration,
    NetworkError, NetworkSpec, PortGroupBinding, VimObjectRef, VimObjectRefs, VimObjectType,
};
pub use reference::{ResourceKind, ResourceReference};
pub use task::{TaskErrorDetail, TaskRecord, TaskStatus};
