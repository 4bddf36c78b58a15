//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate middleware and upstream forwarder produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (decision counters, upstream latency)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for production)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are cheap; without an installed recorder they are no-ops

pub mod logging;
pub mod metrics;
