// Copyright (c) 2025 - Cowboy AI, Inc.
//! External Network Reconciler
//!
//! Ensures one external network exists on the control plane with the
//! configuration given through the environment, recreating it if present.
//!
//! Run with: cargo run --bin extnet-reconcile
//!
//! Prerequisites:
//! 1. Control plane reachable (via VCD_URL environment variable)
//! 2. Bearer token set (via VCD_API_TOKEN environment variable)
//! 3. Virtual center and port group named by VCD_VIM_SERVER / VCD_PORT_GROUP
//!
//! Ctrl-C abandons the current wait; the remote task keeps running.

use anyhow::{Context, Result};
use cim_infrastructure_vcd::{
    domain::{FenceMode, IpScope, NetworkSpec, PortGroupBinding, VimObjectType},
    ControlPlaneConfig, HttpControlPlane, NetworkReconciler, RecreatePolicy,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What to reconcile
#[derive(Debug, Clone)]
struct ReconcileRequest {
    network_name: String,
    recreate_policy: RecreatePolicy,
    spec: NetworkSpec,
}

impl ReconcileRequest {
    /// Load the desired network from environment variables
    fn from_env() -> Result<Self> {
        let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());

        let recreate_policy = var("VCD_RECREATE_POLICY", "always")
            .parse::<RecreatePolicy>()
            .context("Invalid VCD_RECREATE_POLICY")?;

        let ip_scope = IpScope::new(
            var("VCD_NETWORK_GATEWAY", "192.168.201.1"),
            var("VCD_NETWORK_NETMASK", "255.255.255.0"),
        )
        .dns(var("VCD_NETWORK_DNS1", "192.168.202.253"))
        .dns(var("VCD_NETWORK_DNS2", "192.168.202.254"))
        .dns_suffix(var("VCD_NETWORK_DNS_SUFFIX", "example.com"))
        .range(
            var("VCD_NETWORK_RANGE_START", "192.168.201.3"),
            var("VCD_NETWORK_RANGE_END", "192.168.201.250"),
        );

        Ok(Self {
            network_name: var("VCD_NETWORK_NAME", "extnet-reconcile"),
            recreate_policy,
            spec: NetworkSpec {
                description: var("VCD_NETWORK_DESCRIPTION", "Managed by extnet-reconcile"),
                ip_scope,
                fence_mode: FenceMode::Isolated,
                port_group: PortGroupBinding {
                    vim_server: std::env::var("VCD_VIM_SERVER")
                        .context("VCD_VIM_SERVER not set")?,
                    mo_ref: std::env::var("VCD_PORT_GROUP").context("VCD_PORT_GROUP not set")?,
                    object_type: VimObjectType::DvPortgroup,
                },
            },
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting external network reconciliation");

    let config = ControlPlaneConfig::from_env().context("Failed to load control plane config")?;
    let poll = config.poll_policy().context("Invalid poll settings")?;
    let request = ReconcileRequest::from_env()?;
    info!("📋 Configuration loaded:");
    info!("  - Control plane: {}", config.base_url);
    info!("  - API version: {}", config.api_version);
    info!("  - Network: {}", request.network_name);
    info!("  - Recreate policy: {:?}", request.recreate_policy);

    let control_plane =
        HttpControlPlane::new(config).context("Failed to create control plane client")?;
    let reconciler = NetworkReconciler::new(Arc::new(control_plane), poll)
        .context("Invalid poll settings")?
        .with_recreate_policy(request.recreate_policy);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("🛑 Interrupted, abandoning wait");
                cancel.cancel();
            }
        }
    });

    match reconciler
        .ensure_network(&request.network_name, &request.spec, &cancel)
        .await
    {
        Ok(outcome) => {
            info!(
                "✅ {} {:?}: {}",
                outcome.reference.name, outcome.action, outcome.reference.href
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ Reconciliation of '{}' failed: {}", request.network_name, e);
            Err(e).context("Reconciliation failed")
        }
    }
}
