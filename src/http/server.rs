//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the gate middleware and upstream fallback
//! - Wire up middleware (request ID, tracing, timeout, body limit, headers)
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{CookiePresence, SessionSignal};
use crate::config::GateServiceConfig;
use crate::gate::{AccessPolicy, PolicyError};
use crate::http::middleware::gate_middleware;
use crate::http::request::MakeRequestUuidV4;
use crate::http::upstream::{forward, Upstream, UpstreamError};
use crate::security::headers;

/// Error constructing the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Application state injected into the gate middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<AccessPolicy>,
    pub signal: Arc<dyn SessionSignal>,
    pub upstream: Option<Upstream>,
}

/// HTTP server for the gate.
pub struct HttpServer {
    router: Router,
    config: GateServiceConfig,
}

impl HttpServer {
    /// Create a server that reads the session cookie named in the config.
    pub fn new(config: GateServiceConfig) -> Result<Self, ServerError> {
        let signal = Arc::new(CookiePresence::new(config.gate.session_cookie.clone()));
        Self::with_signal(config, signal)
    }

    /// Create a server with a custom session-signal provider.
    pub fn with_signal(
        config: GateServiceConfig,
        signal: Arc<dyn SessionSignal>,
    ) -> Result<Self, ServerError> {
        let policy = Arc::new(AccessPolicy::from_config(&config.gate)?);
        let upstream = Upstream::from_config(&config.upstream)?;

        let state = AppState {
            policy,
            signal,
            upstream,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateServiceConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .fallback(forward)
            .layer(middleware::from_fn_with_state(state.clone(), gate_middleware))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        if config.security.enable_headers {
            router = headers::apply(router);
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            protected = ?self.config.gate.protected_prefixes,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(crate::lifecycle::shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GateServiceConfig {
        &self.config
    }
}
