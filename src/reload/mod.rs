//! Proxy reload coordination subsystem.
//!
//! # Data Flow
//! ```text
//! RoutingService (after a committed write)
//!     → passive.rs (file provider watches the directory: no-op)
//!       or coalesce.rs (single-flight gate, batches concurrent callers)
//!          → restart.rs (docker restart + readiness polling)
//!     → Ok once the proxy serves the new document
//! ```
//!
//! # Design Decisions
//! - The strategy is chosen once, from configuration, never mixed
//! - Every explicit reload is bounded by a timeout
//! - Call sites only see the `ProxyControlPlane` trait

pub mod coalesce;
pub mod passive;
pub mod restart;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ReloadConfig, ReloadStrategy};

pub use coalesce::CoalescingControlPlane;
pub use passive::PassiveReload;
pub use restart::ContainerRestart;

/// The proxy did not confirm adoption of the new configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReloadError {
    /// The restart command could not be run or exited unsuccessfully.
    #[error("failed to signal proxy: {0}")]
    Signal(String),

    /// The proxy did not become ready in time.
    #[error("proxy not confirmed ready within {0:?}")]
    Timeout(Duration),
}

/// Makes the live proxy adopt on-disk routing documents.
#[async_trait]
pub trait ProxyControlPlane: Send + Sync {
    /// Resolve once the proxy serves everything committed before the call.
    async fn reload(&self) -> Result<(), ReloadError>;

    /// Short name for logs and status output.
    fn strategy(&self) -> &'static str;
}

/// The configured control plane could not be built.
#[derive(Debug, Error)]
pub enum ReloadSetupError {
    #[error("reload.readiness_url is required by the restart strategy")]
    MissingReadinessUrl,

    #[error("failed to build readiness client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Build the control plane selected in configuration.
///
/// Container restarts go through the coalescing gate; the passive no-op does not.
pub fn from_config(config: &ReloadConfig) -> Result<Arc<dyn ProxyControlPlane>, ReloadSetupError> {
    let plane: Arc<dyn ProxyControlPlane> = match config.strategy {
        ReloadStrategy::Passive => Arc::new(PassiveReload),
        ReloadStrategy::Restart => Arc::new(CoalescingControlPlane::new(
            Arc::new(ContainerRestart::from_config(config)?),
            config.coalesce_window(),
            config.gate_wait_limit(),
        )),
    };

    tracing::info!(strategy = plane.strategy(), "Proxy reload strategy selected");
    Ok(plane)
}
