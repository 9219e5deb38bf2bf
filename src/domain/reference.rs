// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource references and kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource types this crate looks up through the query service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    ExternalNetwork,
    VirtualCenter,
}

impl ResourceKind {
    /// Type tag understood by the query service
    pub fn query_type(&self) -> &'static str {
        match self {
            ResourceKind::ExternalNetwork => "externalNetwork",
            ResourceKind::VirtualCenter => "virtualCenter",
        }
    }

    /// Media type used when a query record carries none
    pub fn media_type(&self) -> &'static str {
        match self {
            ResourceKind::ExternalNetwork => "application/vnd.vmware.admin.extension.network+json",
            ResourceKind::VirtualCenter => "application/vnd.vmware.admin.vmwvirtualcenter+json",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_type())
    }
}

/// Lightweight, immutable pointer to a remote resource
///
/// Produced by queries and recomputed on every lookup. Absence is never
/// encoded as an empty reference: lookups return `Option<ResourceReference>`.
///
/// # Examples
///
/// ```rust
/// use cim_infrastructure_vcd::domain::ResourceReference;
///
/// let net = ResourceReference::new(
///     "net-A",
///     "https://vcd.example.com/api/admin/extension/externalnet/42",
///     "application/vnd.vmware.admin.extension.network+json",
/// );
/// assert!(net.is_addressable());
/// assert!(!ResourceReference::default().is_addressable());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub media_type: String,
}

impl ResourceReference {
    pub fn new(
        name: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            media_type: media_type.into(),
        }
    }

    /// Reference carrying only an href, as used inside payloads
    pub fn from_href(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    /// Whether the reference can be used to address a remote resource
    pub fn is_addressable(&self) -> bool {
        !self.href.is_empty()
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href_only_reference_serializes_compactly() {
        let reference = ResourceReference::from_href("https://vcd/api/admin/extension/vimServer/1");
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"href": "https://vcd/api/admin/extension/vimServer/1"})
        );
    }

    #[test]
    fn test_reference_reads_type_field() {
        let reference: ResourceReference = serde_json::from_value(serde_json::json!({
            "name": "vc1",
            "href": "https://vcd/api/admin/extension/vimServer/1",
            "type": "application/vnd.vmware.admin.vmwvirtualcenter+json"
        }))
        .unwrap();
        assert_eq!(reference.name, "vc1");
        assert_eq!(
            reference.media_type,
            ResourceKind::VirtualCenter.media_type()
        );
    }

    #[test]
    fn test_query_types() {
        assert_eq!(ResourceKind::ExternalNetwork.query_type(), "externalNetwork");
        assert_eq!(ResourceKind::VirtualCenter.to_string(), "virtualCenter");
    }
}
