//! Inbound routing request types.

use serde::{Deserialize, Serialize};

/// Body of `POST /add-domain` exactly as the caller sent it.
///
/// `port` is kept wide so out-of-range values reach the validator instead of
/// failing inside the JSON extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDomainRequest {
    pub domain: String,
    pub port: i64,
    #[serde(rename = "serviceName", alias = "container_name")]
    pub service_name: String,
}

impl AddDomainRequest {
    pub fn new(domain: impl Into<String>, port: i64, service_name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            port,
            service_name: service_name.into(),
        }
    }
}

/// A request that passed validation.
///
/// Only [`crate::routing::validator::validate`] constructs this type, so every
/// descriptor is built from checked fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingRequest {
    domain: String,
    port: u16,
    service_name: String,
}

impl RoutingRequest {
    pub(crate) fn new_unchecked(domain: String, port: u16, service_name: String) -> Self {
        Self {
            domain,
            port,
            service_name,
        }
    }

    /// Lowercased hostname; also the key of the on-disk document.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}
