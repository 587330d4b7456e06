//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the registrar.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the route registrar.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Where dynamic routing documents are written.
    pub dynamic_config: DynamicConfigDir,

    /// Entry points and certificate resolver baked into every descriptor.
    pub topology: TopologyConfig,

    /// How the live proxy is told about new documents.
    pub reload: ReloadConfig,

    /// Team invitation collaborator.
    pub invite: InviteConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Environment variable that overrides [`DynamicConfigDir::directory`].
pub const DYNAMIC_CONFIG_DIR_ENV: &str = "TRAEFIK_DYNAMIC_CONFIG_DIR";

/// Location and format of the per-domain routing documents.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DynamicConfigDir {
    /// Directory watched by the proxy's file provider.
    pub directory: String,

    /// File extension of the generated documents (`yaml` or `yml`).
    pub extension: String,
}

impl Default for DynamicConfigDir {
    fn default() -> Self {
        Self {
            directory: "/data/coolify/proxy/dynamic/".to_string(),
            extension: "yaml".to_string(),
        }
    }
}

/// Fixed routing topology shared by all generated descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Plain HTTP entry point; traffic here is redirected to HTTPS.
    pub http_entry_point: String,

    /// TLS entry point.
    pub https_entry_point: String,

    /// Name of the externally configured certificate resolver.
    pub cert_resolver: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            http_entry_point: "http".to_string(),
            https_entry_point: "https".to_string(),
            cert_resolver: "letsencrypt".to_string(),
        }
    }
}

/// How the proxy adopts a freshly written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReloadStrategy {
    /// The proxy watches the directory itself; nothing to signal.
    #[default]
    Passive,
    /// Restart the proxy container and wait until it is ready again.
    Restart,
}

impl ReloadStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadStrategy::Passive => "passive",
            ReloadStrategy::Restart => "restart",
        }
    }
}

/// Reload coordination settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    pub strategy: ReloadStrategy,

    /// Docker CLI used by the restart strategy.
    pub docker_bin: String,

    /// Name of the running proxy container.
    pub container: String,

    /// Probed after a restart until it answers 2xx (e.g. Traefik's `/ping`).
    pub readiness_url: Option<String>,

    /// Upper bound for one restart including readiness confirmation.
    pub timeout_secs: u64,

    /// Delay between readiness probes in milliseconds.
    pub poll_interval_ms: u64,

    /// Reload requests arriving within this window share one reload.
    pub coalesce_window_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            strategy: ReloadStrategy::Passive,
            docker_bin: "docker".to_string(),
            container: "coolify-proxy".to_string(),
            readiness_url: None,
            timeout_secs: 15,
            poll_interval_ms: 500,
            coalesce_window_ms: 250,
        }
    }
}

impl ReloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    /// How long a queued caller waits for the reload gate: one reload in flight
    /// plus the one that covers it.
    pub fn gate_wait_limit(&self) -> Duration {
        self.timeout().max(Duration::from_secs(1)) * 2
    }

    /// Longest a single caller can spend in the reload stage.
    pub fn worst_case(&self) -> Duration {
        self.gate_wait_limit() + self.coalesce_window() + self.timeout()
    }
}

/// Team invitation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InviteConfig {
    /// Enable the `/invite` endpoint.
    pub enabled: bool,

    /// Base URL of the team-management web application.
    pub base_url: String,

    /// Timeout for each outbound request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://app-dev.hostspaceng.com".to_string(),
            request_timeout_secs: 15,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
