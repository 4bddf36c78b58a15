//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject malformed, duplicate, overlapping or contradictory gate rules
//! - Validate addresses, upstream URL and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{GateConfig, GateServiceConfig, UpstreamConfig};
use crate::gate::path::{PathPattern, PatternError};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: {source}")]
    InvalidPattern {
        field: &'static str,
        source: PatternError,
    },

    #[error("gate.protected_prefixes: {0} is listed more than once")]
    DuplicatePrefix(String),

    #[error("gate.protected_prefixes: {outer} already covers {inner}")]
    OverlappingPrefix { outer: String, inner: String },

    #[error("gate.exempt_paths: {0} is listed more than once")]
    DuplicateExemptPath(String),

    #[error("gate: {0} is both a protected prefix and an exempt path")]
    Contradiction(String),

    #[error("gate.session_cookie: must not be empty")]
    EmptySessionCookie,

    #[error("{field}: {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.url: {value:?} {reason}")]
    InvalidUpstream { value: String, reason: String },

    #[error("{0}: must be greater than zero")]
    Zero(&'static str),

    #[error("observability.log_level: {0:?} is not a log level")]
    InvalidLogLevel(String),
}

/// Render a list of errors as one line.
pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate the whole service configuration.
pub fn validate_config(config: &GateServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_gate(&config.gate);

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    errors.extend(validate_upstream(&config.upstream));

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    let observability = &config.observability;
    if observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            observability.log_level.clone(),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the route-access rules on their own.
pub fn validate_gate(gate: &GateConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let prefixes = parse_all("gate.protected_prefixes", &gate.protected_prefixes, &mut errors);
    let exempt = parse_all("gate.exempt_paths", &gate.exempt_paths, &mut errors);
    let login = match PathPattern::parse(&gate.login_path) {
        Ok(pattern) => Some(pattern),
        Err(source) => {
            errors.push(ValidationError::InvalidPattern {
                field: "gate.login_path",
                source,
            });
            None
        }
    };

    for (i, prefix) in prefixes.iter().enumerate() {
        for other in &prefixes[i + 1..] {
            if prefix.same_path(other) {
                errors.push(ValidationError::DuplicatePrefix(other.to_string()));
            } else if prefix.covers(other) {
                errors.push(ValidationError::OverlappingPrefix {
                    outer: prefix.to_string(),
                    inner: other.to_string(),
                });
            } else if other.covers(prefix) {
                errors.push(ValidationError::OverlappingPrefix {
                    outer: other.to_string(),
                    inner: prefix.to_string(),
                });
            }
        }
    }

    for (i, path) in exempt.iter().enumerate() {
        if exempt[i + 1..].iter().any(|other| path.same_path(other)) {
            errors.push(ValidationError::DuplicateExemptPath(path.to_string()));
        }
    }

    // The login path is exempt too, so it may not name a protected root either.
    let mut all_exempt: Vec<&PathPattern> = exempt.iter().collect();
    if let Some(login) = login.as_ref() {
        if !exempt.iter().any(|path| path.same_path(login)) {
            all_exempt.push(login);
        }
    }
    for path in all_exempt {
        if prefixes.iter().any(|prefix| prefix.same_path(path)) {
            errors.push(ValidationError::Contradiction(path.to_string()));
        }
    }

    if gate.session_cookie.trim().is_empty() {
        errors.push(ValidationError::EmptySessionCookie);
    }

    errors
}

fn validate_upstream(upstream: &UpstreamConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(raw) = upstream.url.as_deref() {
        let invalid = |reason: &str| ValidationError::InvalidUpstream {
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        match url::Url::parse(raw) {
            Ok(url) if url.scheme() != "http" => errors.push(invalid("must use the http scheme")),
            Ok(url) if url.host_str().is_none() => errors.push(invalid("has no host")),
            Ok(url) if url.path() != "/" || url.query().is_some() => {
                errors.push(invalid("must not carry a path or query"))
            }
            Ok(_) => {}
            Err(e) => errors.push(invalid(&format!("is not a URL ({e})"))),
        }
    }

    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.connect_timeout_secs"));
    }

    errors
}

fn parse_all(
    field: &'static str,
    raw: &[String],
    errors: &mut Vec<ValidationError>,
) -> Vec<PathPattern> {
    raw.iter()
        .filter_map(|value| match PathPattern::parse(value) {
            Ok(pattern) => Some(pattern),
            Err(source) => {
                errors.push(ValidationError::InvalidPattern { field, source });
                None
            }
        })
        .collect()
}
