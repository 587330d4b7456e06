//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per registration)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Failure kinds stay distinct in logs and metrics even though callers only
//!   see a generic failure
//! - Request ID flows through the HTTP layer into every log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
