//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Compile policy → Bind listener → Serve
//!
//! Shutdown:
//!     SIGTERM/SIGINT → signals.rs → Shutdown::trigger → server drains → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, after the policy is known to be valid

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
