//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the selected reload strategy has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RegistrarConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::{RegistrarConfig, ReloadStrategy};

/// A single problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted path of the offending key, e.g. `reload.container`.
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &RegistrarConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.dynamic_config.directory.trim().is_empty() {
        issues.push(ConfigIssue::new("dynamic_config.directory", "must not be empty"));
    }

    if !matches!(config.dynamic_config.extension.as_str(), "yaml" | "yml") {
        issues.push(ConfigIssue::new(
            "dynamic_config.extension",
            "must be 'yaml' or 'yml'",
        ));
    }

    let topology = &config.topology;
    for (field, value) in [
        ("topology.http_entry_point", &topology.http_entry_point),
        ("topology.https_entry_point", &topology.https_entry_point),
        ("topology.cert_resolver", &topology.cert_resolver),
    ] {
        if value.trim().is_empty() {
            issues.push(ConfigIssue::new(field, "must not be empty"));
        }
    }

    if config.reload.strategy == ReloadStrategy::Restart {
        if config.reload.container.trim().is_empty() {
            issues.push(ConfigIssue::new(
                "reload.container",
                "required by the restart strategy",
            ));
        }
        if config.reload.docker_bin.trim().is_empty() {
            issues.push(ConfigIssue::new("reload.docker_bin", "must not be empty"));
        }
        if config.reload.timeout_secs == 0 {
            issues.push(ConfigIssue::new("reload.timeout_secs", "must be > 0"));
        }
        if config.reload.poll_interval_ms == 0 {
            issues.push(ConfigIssue::new("reload.poll_interval_ms", "must be > 0"));
        }
        if config.reload.readiness_url.is_none() {
            issues.push(ConfigIssue::new(
                "reload.readiness_url",
                "required by the restart strategy",
            ));
        }
        // The reload stage must fail on its own deadline, before the request timeout layer.
        let request = Duration::from_secs(config.timeouts.request_secs);
        if request <= config.reload.worst_case() {
            issues.push(ConfigIssue::new(
                "timeouts.request_secs",
                format!(
                    "must exceed {:?} (3 x reload.timeout_secs + reload.coalesce_window_ms)",
                    config.reload.worst_case()
                ),
            ));
        }
    }

    if let Some(readiness) = &config.reload.readiness_url {
        if url::Url::parse(readiness).is_err() {
            issues.push(ConfigIssue::new("reload.readiness_url", "not a valid URL"));
        }
    }

    if config.invite.enabled && url::Url::parse(&config.invite.base_url).is_err() {
        issues.push(ConfigIssue::new("invite.base_url", "not a valid URL"));
    }

    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::new("timeouts.request_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        issues.push(ConfigIssue::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
