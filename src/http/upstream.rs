//! Forwarding of allowed requests to the site renderer.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the renderer's authority
//! - Strip hop-by-hop headers, keep everything else (Host, cookies, request ID)
//! - Stream the renderer's response back unchanged
//!
//! # Design Decisions
//! - No retries: page requests are cheap for the client to repeat
//! - Upstream failures map to 502 Bad Gateway
//! - Without a configured renderer, allowed requests get a plain 404

use std::str::FromStr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, InvalidUriParts, PathAndQuery, Scheme},
        HeaderMap, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Error building the upstream from configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid upstream URL {url:?}: {reason}")]
pub struct UpstreamError {
    url: String,
    reason: String,
}

impl UpstreamError {
    fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// The site renderer behind the gate.
#[derive(Clone)]
pub struct Upstream {
    authority: Authority,
    client: Client<HttpConnector, Body>,
}

impl Upstream {
    /// Build the upstream, or `None` when no renderer is configured.
    pub fn from_config(config: &UpstreamConfig) -> Result<Option<Self>, UpstreamError> {
        let Some(raw) = config.url.as_deref() else {
            return Ok(None);
        };

        let url = url::Url::parse(raw).map_err(|e| UpstreamError::new(raw, e.to_string()))?;
        if url.scheme() != "http" {
            return Err(UpstreamError::new(raw, "only http is supported"));
        }
        let host = url
            .host_str()
            .ok_or_else(|| UpstreamError::new(raw, "missing host"))?;
        let port = url.port_or_known_default().unwrap_or(80);
        let authority = Authority::from_str(&format!("{host}:{port}"))
            .map_err(|e| UpstreamError::new(raw, e.to_string()))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        tracing::info!(upstream = %authority, "Renderer upstream configured");
        Ok(Some(Self { authority, client }))
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    fn rewrite_uri(&self, uri: &Uri) -> Result<Uri, InvalidUriParts> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts)
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in Connection are hop-by-hop as well.
    let named: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in HOP_BY_HOP.iter().copied().chain(named.iter().map(String::as_str)) {
        headers.remove(name);
    }
}

/// Fallback handler: forward an allowed request to the renderer.
pub async fn forward(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(upstream) = state.upstream.as_ref() else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let (mut parts, body) = request.into_parts();

    parts.uri = match upstream.rewrite_uri(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot rewrite request URI");
            return (StatusCode::BAD_REQUEST, "Bad request").into_response();
        }
    };
    strip_hop_by_hop(&mut parts.headers);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding to renderer"
    );

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16(), start);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(StatusCode::BAD_GATEWAY.as_u16(), start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
