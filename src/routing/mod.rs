//! Routing-configuration subsystem.
//!
//! # Data Flow
//! ```text
//! AddDomainRequest (caller JSON)
//!     → validator.rs (structural checks → RoutingRequest)
//!     → descriptor.rs (pure synthesis → RoutingDescriptor)
//!     → writer.rs (YAML encode, temp file + rename)
//!     → reload (ProxyControlPlane)
//!     → service.rs sequences the above and reports the outcome
//! ```
//!
//! # Design Decisions
//! - One document per domain; same-domain requests replace it
//! - Descriptors only come from validated requests
//! - Deterministic: same input always yields the same bytes on disk

pub mod descriptor;
pub mod request;
pub mod service;
pub mod validator;
pub mod writer;

pub use descriptor::{synthesize, RoutingDescriptor};
pub use request::{AddDomainRequest, RoutingRequest};
pub use service::{RouteRegistration, RoutingError, RoutingService, Stage};
pub use validator::{validate, ValidationError};
pub use writer::{ConfigWriter, WriteError};
