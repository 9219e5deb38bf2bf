// Copyright (c) 2025 - Cowboy AI, Inc.
//! Control plane connection settings and task poll policy

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{OrchestrationError, OrchestrationResult};

/// How a task handle polls the remote task
///
/// Intervals start at `min_interval` and grow by `multiplier` after every
/// poll, capped at `max_interval`. A handle never polls faster than
/// `min_interval`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub min_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    /// Overall deadline for one wait; `None` waits until terminal or cancelled
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            multiplier: 1.5,
            timeout: None,
        }
    }
}

impl PollPolicy {
    /// Poll at a constant interval
    pub fn fixed(interval: Duration) -> Self {
        Self {
            min_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject policies that would poll in a tight loop or never back off sanely
    pub fn validate(self) -> OrchestrationResult<Self> {
        if self.min_interval.is_zero() {
            return Err(OrchestrationError::Configuration(
                "poll min interval must be greater than zero".to_string(),
            ));
        }
        if self.max_interval < self.min_interval {
            return Err(OrchestrationError::Configuration(format!(
                "poll max interval {:?} is below min interval {:?}",
                self.max_interval, self.min_interval
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(OrchestrationError::Configuration(format!(
                "poll backoff multiplier must be >= 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(self)
    }

    /// Interval before the first status request
    pub fn first_interval(&self) -> Duration {
        self.min_interval
    }

    /// Interval following `current`, always within `[min_interval, max_interval]`
    pub fn next_interval(&self, current: Duration) -> Duration {
        let grown = Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max_interval);
        grown.max(current).min(self.max_interval).max(self.min_interval)
    }
}

/// Configuration for the control plane connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    /// Base URL (e.g., "https://vcd.example.com")
    pub base_url: String,

    /// Pre-issued bearer token
    #[serde(default)]
    pub api_token: String,

    /// API version sent in the Accept header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_min_interval_ms")]
    pub poll_min_interval_ms: u64,

    #[serde(default = "default_poll_max_interval_ms")]
    pub poll_max_interval_ms: u64,

    #[serde(default = "default_poll_backoff_multiplier")]
    pub poll_backoff_multiplier: f64,

    /// Deadline for a single task wait
    #[serde(default)]
    pub wait_timeout_secs: Option<u64>,
}

fn default_api_version() -> String {
    "36.0".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_poll_min_interval_ms() -> u64 {
    500
}

fn default_poll_max_interval_ms() -> u64 {
    5_000
}

fn default_poll_backoff_multiplier() -> f64 {
    1.5
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vcd.example.com".to_string(),
            api_token: String::new(),
            api_version: default_api_version(),
            timeout_secs: default_timeout(),
            poll_min_interval_ms: default_poll_min_interval_ms(),
            poll_max_interval_ms: default_poll_max_interval_ms(),
            poll_backoff_multiplier: default_poll_backoff_multiplier(),
            wait_timeout_secs: None,
        }
    }
}

impl ControlPlaneConfig {
    /// Load configuration from environment variables
    ///
    /// `VCD_URL` and `VCD_API_TOKEN` are required; `VCD_API_VERSION`,
    /// `VCD_TIMEOUT_SECS`, `VCD_POLL_MIN_MS`, `VCD_POLL_MAX_MS`,
    /// `VCD_POLL_BACKOFF` (multiplier, e.g. `2.0`) and `VCD_WAIT_TIMEOUT_SECS`
    /// are optional.
    pub fn from_env() -> OrchestrationResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OrchestrationResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| OrchestrationError::Configuration(format!("{} not set", key)))
        };
        let number = |key: &str| -> OrchestrationResult<Option<u64>> {
            lookup(key)
                .map(|v| {
                    v.trim().parse::<u64>().map_err(|e| {
                        OrchestrationError::Configuration(format!("{}={}: {}", key, v, e))
                    })
                })
                .transpose()
        };
        let factor = |key: &str| -> OrchestrationResult<Option<f64>> {
            lookup(key)
                .map(|v| {
                    v.trim().parse::<f64>().map_err(|e| {
                        OrchestrationError::Configuration(format!("{}={}: {}", key, v, e))
                    })
                })
                .transpose()
        };

        let defaults = Self::default();
        Ok(Self {
            base_url: required("VCD_URL")?,
            api_token: required("VCD_API_TOKEN")?,
            api_version: lookup("VCD_API_VERSION").unwrap_or(defaults.api_version),
            timeout_secs: number("VCD_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
            poll_min_interval_ms: number("VCD_POLL_MIN_MS")?
                .unwrap_or(defaults.poll_min_interval_ms),
            poll_max_interval_ms: number("VCD_POLL_MAX_MS")?
                .unwrap_or(defaults.poll_max_interval_ms),
            poll_backoff_multiplier: factor("VCD_POLL_BACKOFF")?
                .unwrap_or(defaults.poll_backoff_multiplier),
            wait_timeout_secs: number("VCD_WAIT_TIMEOUT_SECS")?,
        })
    }

    /// Validated poll policy derived from the poll settings
    pub fn poll_policy(&self) -> OrchestrationResult<PollPolicy> {
        PollPolicy {
            min_interval: Duration::from_millis(self.poll_min_interval_ms),
            max_interval: Duration::from_millis(self.poll_max_interval_ms),
            multiplier: self.poll_backoff_multiplier,
            timeout: self.wait_timeout_secs.map(Duration::from_secs),
        }
        .validate()
    }

    /// Absolute URL for an API path
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
