// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed query service
//!
//! The control plane answers typed queries: a resource-type tag plus a
//! filter expression of `field==value` conditions, joined with `;` (AND)
//! and wrapped in parentheses:
//!
//! ```text
//! type=externalNetwork  filter=(name==net-A)
//! type=virtualCenter    filter=(name==vc1;isEnabled==true)
//! ```
//!
//! Filters travel unencoded, so a value containing one of
//! [`RESERVED_FILTER_CHARS`] would split or truncate the query string.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::{ResourceKind, ResourceReference};
use crate::errors::OrchestrationResult;

/// Characters a filter value must not contain
pub const RESERVED_FILTER_CHARS: [char; 5] = ['&', '#', ';', '(', ')'];

/// Filter parse error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryFilterError {
    #[error("Filter expression is empty")]
    Empty,

    #[error("Malformed filter condition: {0}")]
    MalformedCondition(String),
}

/// Conjunction of equality conditions
///
/// # Examples
///
/// ```rust
/// use cim_infrastructure_vcd::query::QueryFilter;
///
/// let filter = QueryFilter::eq("name", "net-A");
/// assert_eq!(filter.to_string(), "(name==net-A)");
///
/// let parsed: QueryFilter = "(name==vc1;isEnabled==true)".parse().unwrap();
/// assert_eq!(parsed.conditions().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    conditions: Vec<(String, String)>,
}

impl QueryFilter {
    /// Single equality condition
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            conditions: vec![(field.into(), value.into())],
        }
    }

    /// Add another condition (AND)
    pub fn and(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }

    /// Whether a record satisfies every condition
    pub fn matches(&self, record: &QueryRecord) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| record.attribute(field).as_deref() == Some(value.as_str()))
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .conditions
            .iter()
            .map(|(field, value)| format!("{}=={}", field, value))
            .collect::<Vec<_>>()
            .join(";");
        write!(f, "({})", body)
    }
}

impl std::str::FromStr for QueryFilter {
    type Err = QueryFilterError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let trimmed = expr.trim();
        let body = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);

        if body.trim().is_empty() {
            return Err(QueryFilterError::Empty);
        }

        let conditions = body
            .split(';')
            .map(|condition| match condition.split_once("==") {
                Some((field, value)) if !field.trim().is_empty() => {
                    Ok((field.trim().to_string(), value.to_string()))
                }
                _ => Err(QueryFilterError::MalformedCondition(condition.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { conditions })
    }
}

/// One row of a query result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub media_type: String,

    /// Remaining record attributes (isEnabled, vcVersion, ...)
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl QueryRecord {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, field: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(field.into(), value);
        self
    }

    /// Attribute value rendered the way filters compare it
    pub fn attribute(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "href" => Some(self.href.clone()),
            _ => self.attributes.get(field).map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }

    /// Reference to the record, defaulting the media type from its kind
    pub fn to_reference(&self, kind: ResourceKind) -> ResourceReference {
        let media_type = if self.media_type.is_empty() {
            kind.media_type().to_string()
        } else {
            self.media_type.clone()
        };
        ResourceReference::new(self.name.clone(), self.href.clone(), media_type)
    }
}

/// Envelope of a records-format query response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResultRecords {
    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub record: Vec<QueryRecord>,
}

/// Query service consumed by the locator
#[async_trait]
pub trait QueryFacade: Send + Sync {
    /// Run a typed query with an unencoded filter expression
    async fn query(&self, resource_type: &str, filter: &str)
        -> OrchestrationResult<Vec<QueryRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_condition_rendering() {
        assert_eq!(QueryFilter::eq("name", "vc1").to_string(), "(name==vc1)");
        assert_eq!(
            QueryFilter::eq("name", "vc1")
                .and("isEnabled", "true")
                .to_string(),
            "(name==vc1;isEnabled==true)"
        );
    }

    #[test]
    fn test_parse_without_parentheses() {
        let filter: QueryFilter = "name==net-A".parse().unwrap();
        assert_eq!(filter, QueryFilter::eq("name", "net-A"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("()".parse::<QueryFilter>(), Err(QueryFilterError::Empty));
        assert!(matches!(
            "(name=net-A)".parse::<QueryFilter>(),
            Err(QueryFilterError::MalformedCondition(_))
        ));
        assert!(matches!(
            "(==net-A)".parse::<QueryFilter>(),
            Err(QueryFilterError::MalformedCondition(_))
        ));
    }

    #[test]
    fn test_matches_attributes() {
        let record = QueryRecord::new("vc1", "https://vcd/api/admin/extension/vimServer/1")
            .with_attribute("isEnabled", serde_json::json!(true));

        assert!(QueryFilter::eq("name", "vc1").matches(&record));
        assert!(QueryFilter::eq("name", "vc1")
            .and("isEnabled", "true")
            .matches(&record));
        assert!(!QueryFilter::eq("name", "vc2").matches(&record));
        assert!(!QueryFilter::eq("vcVersion", "8.0").matches(&record));
    }

    #[test]
    fn test_record_envelope_keeps_extra_attributes() {
        let records: QueryResultRecords = serde_json::from_value(serde_json::json!({
            "total": 1,
            "record": [{
                "_type": "QueryResultVirtualCenterRecordType",
                "name": "vc1",
                "href": "https://vcd/api/admin/extension/vimServer/1",
                "isEnabled": true
            }]
        }))
        .unwrap();

        let record = &records.record[0];
        assert_eq!(record.name, "vc1");
        assert_eq!(record.attribute("isEnabled").as_deref(), Some("true"));
        assert_eq!(
            record.to_reference(ResourceKind::VirtualCenter).media_type,
            ResourceKind::VirtualCenter.media_type()
        );
    }
}
