// Copyright (c) 2025 - Cowboy AI, Inc.
//! External Network Definitions with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

use super::reference::ResourceReference;

/// Network definition validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Network name is empty")]
    EmptyName,

    #[error("Network configuration has no IP scope")]
    MissingIpScope,

    #[error("Invalid IPv4 address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid netmask (must be a contiguous IPv4 mask): {0}")]
    InvalidNetmask(String),

    #[error("IP range start {start} is above its end {end}")]
    InvertedRange { start: String, end: String },

    #[error("Address {address} is outside the subnet of gateway {gateway}/{netmask}")]
    OutsideSubnet {
        address: String,
        gateway: String,
        netmask: String,
    },

    #[error("Gateway {0} lies inside a static IP range")]
    GatewayInRange(String),

    #[error("Network has no port group reference")]
    MissingPortGroup,

    #[error("Port group reference has an empty managed object reference")]
    EmptyManagedObjectRef,

    #[error("Port group {0} has no VIM server reference")]
    MissingVimServer(String),
}

fn parse_ipv4(value: &str) -> Result<Ipv4Addr, NetworkError> {
    Ipv4Addr::from_str(value).map_err(|_| NetworkError::InvalidIpAddress(value.to_string()))
}

/// Network isolation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FenceMode {
    #[default]
    Isolated,
    Bridged,
    NatRouted,
}

impl fmt::Display for FenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenceMode::Isolated => write!(f, "isolated"),
            FenceMode::Bridged => write!(f, "bridged"),
            FenceMode::NatRouted => write!(f, "natRouted"),
        }
    }
}

/// Kind of vSphere object backing the network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VimObjectType {
    #[default]
    #[serde(rename = "DV_PORTGROUP")]
    DvPortgroup,
    #[serde(rename = "NETWORK")]
    Network,
}

/// Inclusive static address pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpRange {
    pub start_address: String,
    pub end_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpRanges {
    #[serde(default)]
    pub ip_range: Vec<IpRange>,
}

/// Addressing of one subnet
///
/// # Invariants
/// - Gateway, DNS servers and range bounds are IPv4 literals
/// - Netmask is contiguous
/// - Every range is ordered and inside the gateway's subnet
/// - The gateway is not handed out by any range
///
/// # Examples
///
/// ```rust
/// use cim_infrastructure_vcd::domain::IpScope;
///
/// let scope = IpScope::new("192.168.201.1", "255.255.255.0")
///     .dns("192.168.202.253")
///     .dns("192.168.202.254")
///     .range("192.168.201.3", "192.168.201.250");
/// assert!(scope.validate().is_ok());
///
/// let bad = IpScope::new("192.168.201.1", "255.255.255.0")
///     .range("192.168.201.1", "192.168.201.10");
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpScope {
    #[serde(default)]
    pub is_inherited: bool,
    pub gateway: String,
    pub netmask: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_suffix: Option<String>,
    #[serde(default)]
    pub ip_ranges: IpRanges,
}

impl IpScope {
    pub fn new(gateway: impl Into<String>, netmask: impl Into<String>) -> Self {
        Self {
            is_inherited: false,
            gateway: gateway.into(),
            netmask: netmask.into(),
            dns1: None,
            dns2: None,
            dns_suffix: None,
            ip_ranges: IpRanges::default(),
        }
    }

    /// Add a DNS server (first call sets the primary, second the secondary)
    pub fn dns(mut self, server: impl Into<String>) -> Self {
        if self.dns1.is_none() {
            self.dns1 = Some(server.into());
        } else {
            self.dns2 = Some(server.into());
        }
        self
    }

    pub fn dns_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.dns_suffix = Some(suffix.into());
        self
    }

    /// Add a static address range
    pub fn range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.ip_ranges.ip_range.push(IpRange {
            start_address: start.into(),
            end_address: end.into(),
        });
        self
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        let gateway = parse_ipv4(&self.gateway)?;
        let netmask = parse_ipv4(&self.netmask)?;

        let mask = u32::from(netmask);
        if mask.leading_ones() + mask.trailing_zeros() != 32 {
            return Err(NetworkError::InvalidNetmask(self.netmask.clone()));
        }
        let subnet = u32::from(gateway) & mask;

        for dns in self.dns1.iter().chain(self.dns2.iter()) {
            parse_ipv4(dns)?;
        }

        for range in &self.ip_ranges.ip_range {
            let start = parse_ipv4(&range.start_address)?;
            let end = parse_ipv4(&range.end_address)?;

            if start > end {
                return Err(NetworkError::InvertedRange {
                    start: range.start_address.clone(),
                    end: range.end_address.clone(),
                });
            }

            for (address, text) in [(start, &range.start_address), (end, &range.end_address)] {
                if u32::from(address) & mask != subnet {
                    return Err(NetworkError::OutsideSubnet {
                        address: text.clone(),
                        gateway: self.gateway.clone(),
                        netmask: self.netmask.clone(),
                    });
                }
            }

            if start <= gateway && gateway <= end {
                return Err(NetworkError::GatewayInRange(self.gateway.clone()));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpScopes {
    #[serde(default)]
    pub ip_scope: Vec<IpScope>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfiguration {
    #[serde(default)]
    pub ip_scopes: IpScopes,
    #[serde(default)]
    pub fence_mode: FenceMode,
}

/// Port group backing an external network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VimObjectRef {
    pub vim_server_ref: ResourceReference,
    pub mo_ref: String,
    #[serde(default)]
    pub vim_object_type: VimObjectType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VimObjectRefs {
    #[serde(default)]
    pub vim_object_ref: Vec<VimObjectRef>,
}

/// Creation payload for an external network
///
/// Owned by the caller and passed through to the control plane unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNetworkDefinition {
    /// Set by the remote once the network exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub configuration: NetworkConfiguration,

    #[serde(default)]
    pub vim_port_group_refs: VimObjectRefs,
}

impl ExternalNetworkDefinition {
    /// Check every local invariant before the payload leaves the process
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.name.trim().is_empty() {
            return Err(NetworkError::EmptyName);
        }

        if self.configuration.ip_scopes.ip_scope.is_empty() {
            return Err(NetworkError::MissingIpScope);
        }
        for scope in &self.configuration.ip_scopes.ip_scope {
            scope.validate()?;
        }

        if self.vim_port_group_refs.vim_object_ref.is_empty() {
            return Err(NetworkError::MissingPortGroup);
        }
        for port_group in &self.vim_port_group_refs.vim_object_ref {
            if port_group.mo_ref.trim().is_empty() {
                return Err(NetworkError::EmptyManagedObjectRef);
            }
            if !port_group.vim_server_ref.is_addressable() {
                return Err(NetworkError::MissingVimServer(port_group.mo_ref.clone()));
            }
        }

        Ok(())
    }

    /// Whether an existing network already matches this desired definition
    ///
    /// Remote-assigned fields (hrefs of the network itself, names and media
    /// types on server references) are ignored.
    pub fn converges_with(&self, actual: &ExternalNetworkDefinition) -> bool {
        self.name == actual.name
            && self.description == actual.description
            && self.configuration == actual.configuration
            && port_group_keys(self) == port_group_keys(actual)
    }
}

fn port_group_keys(definition: &ExternalNetworkDefinition) -> Vec<(&str, &str, VimObjectType)> {
    let mut keys: Vec<_> = definition
        .vim_port_group_refs
        .vim_object_ref
        .iter()
        .map(|r| (r.vim_server_ref.href.as_str(), r.mo_ref.as_str(), r.vim_object_type))
        .collect();
    keys.sort();
    keys
}

/// Port group binding naming its virtual center by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortGroupBinding {
    /// Name of the virtual center that owns the port group
    pub vim_server: String,
    /// Managed object reference of the port group, e.g. "dvportgroup-42"
    pub mo_ref: String,
    #[serde(default)]
    pub object_type: VimObjectType,
}

/// Desired external network configuration before dependency resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default)]
    pub description: String,
    pub ip_scope: IpScope,
    #[serde(default)]
    pub fence_mode: FenceMode,
    pub port_group: PortGroupBinding,
}

impl NetworkSpec {
    /// Build the creation payload once the virtual center has been resolved
    pub fn to_definition(
        &self,
        name: &str,
        vim_server: &ResourceReference,
    ) -> ExternalNetworkDefinition {
        ExternalNetworkDefinition {
            href: None,
            name: name.to_string(),
            description: self.description.clone(),
            configuration: NetworkConfiguration {
                ip_scopes: IpScopes {
                    ip_scope: vec![self.ip_scope.clone()],
                },
                fence_mode: self.fence_mode,
            },
            vim_port_group_refs: VimObjectRefs {
                vim_object_ref: vec![VimObjectRef {
                    vim_server_ref: ResourceReference::from_href(vim_server.href.clone()),
                    mo_ref: self.port_group.mo_ref.clone(),
                    vim_object_type: self.port_group.object_type,
                }],
            },
        }
    }
}
