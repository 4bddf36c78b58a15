//! Route-access gate for the car-rental website.
//!
//! Sits in front of the site renderer, keeps the admin namespace behind a
//! session signal, and forwards everything else untouched.

pub mod auth;
pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GateServiceConfig;
pub use gate::{AccessPolicy, RoutingDecision};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
