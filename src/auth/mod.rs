//! Session-signal providers.
//!
//! # Responsibilities
//! - Turn request headers into the single boolean the gate consumes
//!
//! # Design Decisions
//! - Presence only: credentials are never decoded, verified or refreshed
//! - Issuing and validating real sessions belongs to the login service
//! - Providers are injected into the HTTP layer as `Arc<dyn SessionSignal>`

pub mod cookie;

use axum::http::HeaderMap;

pub use cookie::CookiePresence;

/// Answers "does this request carry a session?" from its headers.
pub trait SessionSignal: Send + Sync + std::fmt::Debug {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool;
}

/// A signal with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticSignal(pub bool);

impl SessionSignal for StaticSignal {
    fn is_authenticated(&self, _headers: &HeaderMap) -> bool {
        self.0
    }
}
