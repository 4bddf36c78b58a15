//! Route-access gate.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     GateConfig
//!     → validation (duplicates, overlaps, contradictions)
//!     → compile PathPatterns into AccessRules
//!     → freeze as immutable AccessPolicy (shared via Arc)
//!
//! Per request:
//!     (path, is_authenticated)
//!     → 1. exact exemption?        → Allow
//!     → 2. under protected prefix? → no: Allow
//!     → 3. authenticated?          → yes: Allow, no: RedirectTo(login_path)
//! ```
//!
//! # Design Decisions
//! - Exemption check always runs first, so the login page can never loop
//! - Prefixes match whole path segments, after percent-decoding and dot-segment removal
//! - Allow-by-default outside protected prefixes; fail closed inside them
//! - Authentication is an opaque boolean supplied by the caller

pub mod decision;
pub mod path;
pub mod policy;

pub use decision::{Redirect, RedirectStatus, RequestDescriptor, RoutingDecision};
pub use path::{PathPattern, PatternError};
pub use policy::{AccessPolicy, AccessRule, PolicyError};
