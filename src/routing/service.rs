//! Registration pipeline: validate → synthesize → write → reload.
//!
//! # State Machine
//! ```text
//! Validating → Synthesizing → Writing → Reloading → Done
//!      └────────────┴────────────┴──────────┴──→ Failed(reason)
//! ```
//!
//! # Design Decisions
//! - Strictly linear; the first failing stage ends the request
//! - No automatic retries anywhere
//! - A reload failure leaves the committed document in place
//! - `Done` only after the control plane confirmed the reload

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{RegistrarConfig, TopologyConfig};
use crate::observability::metrics;
use crate::reload::{ProxyControlPlane, ReloadError};
use crate::routing::descriptor::synthesize;
use crate::routing::request::AddDomainRequest;
use crate::routing::validator::{validate, ValidationError};
use crate::routing::writer::{ConfigWriter, WriteError};

/// Pipeline stage, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Synthesizing,
    Writing,
    Reloading,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Synthesizing => "synthesizing",
            Stage::Writing => "writing",
            Stage::Reloading => "reloading",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why a registration failed.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not persist routing document: {0}")]
    Io(#[from] WriteError),

    #[error("proxy reload failed: {0}")]
    Reload(#[from] ReloadError),
}

impl RoutingError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingError::Validation(_) => "validation",
            RoutingError::Io(_) => "io",
            RoutingError::Reload(_) => "reload",
        }
    }

    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            RoutingError::Validation(_) => Stage::Validating,
            RoutingError::Io(_) => Stage::Writing,
            RoutingError::Reload(_) => Stage::Reloading,
        }
    }

    /// Message safe to return to callers. Internal error text stays in the logs.
    pub fn public_detail(&self) -> String {
        match self {
            RoutingError::Validation(e) => e.to_string(),
            RoutingError::Io(_) => "Failed to store routing configuration".to_string(),
            RoutingError::Reload(_) => {
                "Routing configuration stored but the proxy did not confirm the reload".to_string()
            }
        }
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRegistration {
    pub domain: String,
    pub service: String,
    pub routers: Vec<String>,
    pub path: PathBuf,
}

/// Sequences the registration stages for each request.
pub struct RoutingService {
    topology: TopologyConfig,
    writer: ConfigWriter,
    control_plane: Arc<dyn ProxyControlPlane>,
}

impl RoutingService {
    pub fn new(
        topology: TopologyConfig,
        writer: ConfigWriter,
        control_plane: Arc<dyn ProxyControlPlane>,
    ) -> Self {
        Self {
            topology,
            writer,
            control_plane,
        }
    }

    pub fn from_config(config: &RegistrarConfig, control_plane: Arc<dyn ProxyControlPlane>) -> Self {
        Self::new(
            config.topology.clone(),
            ConfigWriter::from_config(&config.dynamic_config),
            control_plane,
        )
    }

    pub fn reload_strategy(&self) -> &'static str {
        self.control_plane.strategy()
    }

    pub fn writer(&self) -> &ConfigWriter {
        &self.writer
    }

    /// Register `raw.domain` → `raw.service_name:raw.port` and make the proxy serve it.
    #[tracing::instrument(
        name = "add_domain",
        skip(self, raw),
        fields(domain = %raw.domain, service = %raw.service_name, port = raw.port)
    )]
    pub async fn add_domain(&self, raw: &AddDomainRequest) -> Result<RouteRegistration, RoutingError> {
        match self.run(raw).await {
            Ok(registration) => {
                metrics::record_request("ok");
                tracing::info!(path = ?registration.path, stage = %Stage::Done, "Domain registered");
                Ok(registration)
            }
            Err(e) => {
                metrics::record_request("error");
                metrics::record_failure(e.kind());
                match &e {
                    RoutingError::Validation(_) => {
                        tracing::warn!(error_kind = e.kind(), stage = %e.stage(), error = %e, "Registration rejected");
                    }
                    _ => {
                        tracing::error!(error_kind = e.kind(), stage = %e.stage(), error = %e, "Registration failed");
                    }
                }
                Err(e)
            }
        }
    }

    async fn run(&self, raw: &AddDomainRequest) -> Result<RouteRegistration, RoutingError> {
        tracing::debug!(stage = %Stage::Validating);
        let request = validate(raw)?;

        tracing::debug!(stage = %Stage::Synthesizing);
        let descriptor = synthesize(&request, &self.topology);

        tracing::debug!(stage = %Stage::Writing);
        let path = self.writer.write(request.domain(), &descriptor).await?;

        tracing::debug!(stage = %Stage::Reloading, strategy = self.control_plane.strategy());
        self.control_plane.reload().await?;

        Ok(RouteRegistration {
            domain: request.domain().to_string(),
            service: request.service_name().to_string(),
            routers: descriptor.routers().keys().cloned().collect(),
            path,
        })
    }
}
