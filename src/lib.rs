//! Route registrar library: register a hostname → container mapping and make
//! a Traefik proxy serve it.

pub mod config;
pub mod http;
pub mod invite;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod routing;

pub use config::schema::RegistrarConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RoutingService;
