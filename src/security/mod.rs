//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response (redirect or renderer page):
//!     → headers.rs (add hardening headers unless already set)
//! ```
//!
//! # Design Decisions
//! - Renderer-set headers win; the gate only fills gaps
//! - Body size limit and timeouts are wired in http::server

pub mod headers;
