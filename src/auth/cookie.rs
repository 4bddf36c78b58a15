//! Cookie-presence session signal.

use axum::http::{header::COOKIE, HeaderMap};

use crate::auth::SessionSignal;

/// Authenticated when a named cookie is present with a non-empty value.
#[derive(Debug, Clone)]
pub struct CookiePresence {
    cookie_name: String,
}

impl CookiePresence {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

impl SessionSignal for CookiePresence {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.split_once('='))
            .any(|(name, value)| name.trim() == self.cookie_name && !unquote(value).is_empty())
    }
}

/// A cookie value without surrounding whitespace or its optional DQUOTE pair.
fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
