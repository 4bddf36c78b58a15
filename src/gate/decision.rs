//! Gate inputs and outputs.

use serde::{Deserialize, Serialize};

/// What the gate needs to know about one inbound request.
///
/// Built per request by the serving layer and discarded after evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// URL path, expected to start with `/`.
    pub path: String,

    /// Whether the request carries a session signal. The gate never looks
    /// at the credential itself.
    pub is_authenticated: bool,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>, is_authenticated: bool) -> Self {
        Self {
            path: path.into(),
            is_authenticated,
        }
    }
}

/// Temporary-class redirect statuses the gate may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectStatus {
    /// 302 Found.
    #[default]
    Found,
    /// 303 See Other.
    SeeOther,
    /// 307 Temporary Redirect.
    TemporaryRedirect,
}

impl RedirectStatus {
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::Found => 302,
            RedirectStatus::SeeOther => 303,
            RedirectStatus::TemporaryRedirect => 307,
        }
    }
}

/// Where to send a rejected request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub target: String,
    pub status: RedirectStatus,
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Serve the request unmodified.
    Allow,
    /// Short-circuit with a redirect. The original path is not carried along.
    RedirectTo(Redirect),
}

impl RoutingDecision {
    /// A redirect with the default (302) status.
    pub fn redirect_to(target: impl Into<String>) -> Self {
        RoutingDecision::RedirectTo(Redirect {
            target: target.into(),
            status: RedirectStatus::default(),
        })
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, RoutingDecision::Allow)
    }

    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            RoutingDecision::Allow => "allow",
            RoutingDecision::RedirectTo(_) => "redirect",
        }
    }
}
