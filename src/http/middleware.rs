//! Route-access gate middleware.
//!
//! Runs before any upstream call: builds a [`RequestDescriptor`] from the
//! request path and the session signal, evaluates the policy, and either
//! passes the request on or answers with the login redirect.
//!
//! The path is canonicalized first. The decision is made on the canonical
//! path and an allowed request continues with that path, so the renderer
//! never receives a path other than the one that was evaluated.

use axum::{
    body::Body,
    extract::State,
    http::{header::LOCATION, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::gate::path::canonical_path;
use crate::gate::{Redirect, RequestDescriptor, RoutingDecision};
use crate::http::request::{request_id, with_path};
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn gate_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(path) = canonical_path(request.uri().path()) else {
        tracing::warn!(
            request_id = %request_id(request.headers()),
            uri = %request.uri(),
            "Request target has no absolute path"
        );
        return (StatusCode::BAD_REQUEST, "Bad request").into_response();
    };

    let descriptor = RequestDescriptor::new(
        path,
        state.signal.is_authenticated(request.headers()),
    );

    let decision = state.policy.evaluate_request(&descriptor);
    metrics::record_decision(decision.outcome());

    match decision {
        RoutingDecision::Allow => {
            if descriptor.path != request.uri().path() {
                match with_path(request.uri(), &descriptor.path) {
                    Ok(uri) => {
                        tracing::debug!(
                            request_id = %request_id(request.headers()),
                            from = %request.uri().path(),
                            to = %descriptor.path,
                            "Request path canonicalized"
                        );
                        *request.uri_mut() = uri;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Cannot rebuild request URI");
                        return (StatusCode::BAD_REQUEST, "Bad request").into_response();
                    }
                }
            }
            next.run(request).await
        }
        RoutingDecision::RedirectTo(redirect) => {
            tracing::debug!(
                request_id = %request_id(request.headers()),
                path = %descriptor.path,
                location = %redirect.target,
                "Protected path without session, redirecting to login"
            );
            redirect_response(&redirect)
        }
    }
}

fn redirect_response(redirect: &Redirect) -> Response {
    let status = StatusCode::from_u16(redirect.status.code()).unwrap_or(StatusCode::FOUND);

    match HeaderValue::from_str(&redirect.target) {
        Ok(location) => (status, [(LOCATION, location)]).into_response(),
        Err(e) => {
            // Never serve a protected page because the redirect could not be built.
            tracing::error!(login_path = %redirect.target, error = %e, "Invalid login path");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
