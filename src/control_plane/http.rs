// Copyright (c) 2025 - Cowboy AI, Inc.
//! REST control plane client
//!
//! Talks JSON to the control plane's REST API:
//!
//! ```text
//! query    GET    {base}/api/query?type=..&format=records&filter=..
//! create   POST   {base}/api/admin/extension/externalnets
//! delete   DELETE {href}
//! task     GET    {href}
//! network  GET    {href}
//! ```
//!
//! Every request carries the bearer token, the versioned `Accept` header and
//! a fresh client request id.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ControlPlane;
use crate::config::ControlPlaneConfig;
use crate::domain::{ExternalNetworkDefinition, TaskRecord};
use crate::errors::{OrchestrationError, OrchestrationResult};
use crate::query::{QueryFacade, QueryRecord, QueryResultRecords};

const CLIENT_REQUEST_ID: &str = "X-VMWARE-VCLOUD-CLIENT-REQUEST-ID";
const EXTERNAL_NETWORK_CONTENT_TYPE: &str = "application/vnd.vmware.admin.vmwexternalnet+json";

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    major_error_code: i32,
    #[serde(default)]
    minor_error_code: String,
}

/// Resource body carrying the tasks started for it
#[derive(Debug, Deserialize)]
struct TaskOwner {
    #[serde(default)]
    tasks: Option<TaskList>,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    #[serde(default)]
    task: Vec<TaskRecord>,
}

/// Control plane reached over HTTP
pub struct HttpControlPlane {
    config: ControlPlaneConfig,
    client: Client,
}

impl HttpControlPlane {
    /// Create a client for the configured control plane
    pub fn new(config: ControlPlaneConfig) -> OrchestrationResult<Self> {
        info!("Connecting to control plane at {}", config.base_url);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    "Authorization",
                    format!("Bearer {}", config.api_token).parse().map_err(|e| {
                        OrchestrationError::Configuration(format!("Invalid API token: {}", e))
                    })?,
                );
                headers.insert(
                    "Accept",
                    format!("application/*+json;version={}", config.api_version)
                        .parse()
                        .map_err(|e| {
                            OrchestrationError::Configuration(format!(
                                "Invalid API version: {}",
                                e
                            ))
                        })?,
                );
                headers
            })
            .build()
            .map_err(|e| {
                OrchestrationError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ControlPlaneConfig {
        &self.config
    }

    /// Map non-2xx responses onto the error taxonomy
    async fn check(response: Response, target: &str) -> OrchestrationResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(OrchestrationError::NotFound(target.to_string()));
        }

        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) if !err.message.is_empty() => format!(
                "{} [major {}, minor {}]",
                err.message, err.major_error_code, err.minor_error_code
            ),
            _ => body,
        };
        warn!("Control plane rejected request to {}: {} {}", target, status, message);
        Err(OrchestrationError::RequestRejected {
            status: status.as_u16(),
            message,
        })
    }

    fn request_id() -> String {
        Uuid::now_v7().to_string()
    }
}

#[async_trait]
impl QueryFacade for HttpControlPlane {
    async fn query(
        &self,
        resource_type: &str,
        filter: &str,
    ) -> OrchestrationResult<Vec<QueryRecord>> {
        let url = format!(
            "{}?type={}&format=records&filter={}",
            self.config.api_url("/api/query"),
            resource_type,
            filter
        );
        debug!("Query {} {}", resource_type, filter);

        let response = self
            .client
            .get(&url)
            .header(CLIENT_REQUEST_ID, Self::request_id())
            .send()
            .await?;
        let records: QueryResultRecords = Self::check(response, &url).await?.json().await?;
        Ok(records.record)
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn create_external_network(
        &self,
        definition: &ExternalNetworkDefinition,
    ) -> OrchestrationResult<TaskRecord> {
        let url = self.config.api_url("/api/admin/extension/externalnets");
        debug!("Creating external network {}", definition.name);

        let response = self
            .client
            .post(&url)
            .header(CLIENT_REQUEST_ID, Self::request_id())
            .header("Content-Type", EXTERNAL_NETWORK_CONTENT_TYPE)
            .body(serde_json::to_vec(definition)?)
            .send()
            .await?;
        let owner: TaskOwner = Self::check(response, &url).await?.json().await?;

        owner
            .tasks
            .and_then(|list| list.task.into_iter().next())
            .ok_or_else(|| {
                OrchestrationError::Inconsistent(format!(
                    "Create of '{}' was accepted without a task",
                    definition.name
                ))
            })
    }

    async fn delete_resource(&self, href: &str) -> OrchestrationResult<TaskRecord> {
        debug!("Deleting {}", href);
        let response = self
            .client
            .delete(href)
            .header(CLIENT_REQUEST_ID, Self::request_id())
            .send()
            .await?;
        Ok(Self::check(response, href).await?.json().await?)
    }

    async fn get_task(&self, href: &str) -> OrchestrationResult<TaskRecord> {
        let response = self
            .client
            .get(href)
            .header(CLIENT_REQUEST_ID, Self::request_id())
            .send()
            .await?;
        Ok(Self::check(response, href).await?.json().await?)
    }

    async fn get_external_network(
        &self,
        href: &str,
    ) -> OrchestrationResult<ExternalNetworkDefinition> {
        let response = self
            .client
            .get(href)
            .header(CLIENT_REQUEST_ID, Self::request_id())
            .send()
            .await?;
        Ok(Self::check(response, href).await?.json().await?)
    }
}
