//! Typed Traefik dynamic-configuration documents.
//!
//! # Layout
//! ```text
//! http:
//!   middlewares:  redirect-to-https, gzip
//!   routers:      {service}-http  → redirect-to-https
//!                 {service}-https → tls.certResolver
//!   services:     {service}       → http://{service}:{port}
//! ```
//!
//! # Design Decisions
//! - Descriptors are only produced by [`synthesize`]; routers and their
//!   service always come as one unit
//! - Ordered maps everywhere so the same request serializes to the same bytes
//! - Field names follow Traefik's camelCase file-provider schema

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::TopologyConfig;
use crate::routing::request::RoutingRequest;

pub const REDIRECT_MIDDLEWARE: &str = "redirect-to-https";
pub const COMPRESS_MIDDLEWARE: &str = "gzip";

/// One per-domain dynamic configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDescriptor {
    http: HttpConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HttpConfiguration {
    middlewares: BTreeMap<String, Middleware>,
    routers: BTreeMap<String, RouterEntry>,
    services: BTreeMap<String, ServiceEntry>,
}

/// A named middleware. Exactly one of the fields is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Middleware {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_scheme: Option<RedirectScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<Compress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectScheme {
    pub scheme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Compress {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterEntry {
    pub entry_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,
    pub rule: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouterTls>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterTls {
    pub cert_resolver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub load_balancer: LoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub servers: Vec<Server>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

impl RoutingDescriptor {
    pub fn middlewares(&self) -> &BTreeMap<String, Middleware> {
        &self.http.middlewares
    }

    pub fn routers(&self) -> &BTreeMap<String, RouterEntry> {
        &self.http.routers
    }

    pub fn services(&self) -> &BTreeMap<String, ServiceEntry> {
        &self.http.services
    }

    pub fn router(&self, name: &str) -> Option<&RouterEntry> {
        self.http.routers.get(name)
    }

    pub fn service(&self, name: &str) -> Option<&ServiceEntry> {
        self.http.services.get(name)
    }

    /// Encode as a YAML document for Traefik's file provider.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Build the descriptor for a validated request. Pure and deterministic.
pub fn synthesize(request: &RoutingRequest, topology: &TopologyConfig) -> RoutingDescriptor {
    let service = request.service_name().to_string();
    let rule = format!("Host(`{}`)", request.domain());

    let mut middlewares = BTreeMap::new();
    middlewares.insert(
        REDIRECT_MIDDLEWARE.to_string(),
        Middleware {
            redirect_scheme: Some(RedirectScheme {
                scheme: "https".to_string(),
            }),
            compress: None,
        },
    );
    middlewares.insert(
        COMPRESS_MIDDLEWARE.to_string(),
        Middleware {
            redirect_scheme: None,
            compress: Some(Compress::default()),
        },
    );

    let mut routers = BTreeMap::new();
    routers.insert(
        format!("{}-http", service),
        RouterEntry {
            entry_points: vec![topology.http_entry_point.clone()],
            middlewares: vec![REDIRECT_MIDDLEWARE.to_string()],
            rule: rule.clone(),
            service: service.clone(),
            tls: None,
        },
    );
    routers.insert(
        format!("{}-https", service),
        RouterEntry {
            entry_points: vec![topology.https_entry_point.clone()],
            middlewares: Vec::new(),
            rule,
            service: service.clone(),
            tls: Some(RouterTls {
                cert_resolver: topology.cert_resolver.clone(),
            }),
        },
    );

    let mut services = BTreeMap::new();
    services.insert(
        service.clone(),
        ServiceEntry {
            load_balancer: LoadBalancer {
                servers: vec![Server {
                    url: format!("http://{}:{}", service, request.port()),
                }],
            },
        },
    );

    RoutingDescriptor {
        http: HttpConfiguration {
            middlewares,
            routers,
            services,
        },
    }
}
