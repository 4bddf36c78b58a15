//! Compiled route-access policy.
//!
//! # Responsibilities
//! - Compile [`GateConfig`] into immutable [`AccessRule`]s
//! - Evaluate `(path, is_authenticated)` into a [`RoutingDecision`]
//!
//! # Design Decisions
//! - Exemptions are checked before protection, across all rules
//! - Allow-by-default: only matched protected prefixes can redirect
//! - Pure: no caching, no interior mutability, safe to share via `Arc`

use crate::config::validation::{join_errors, validate_gate, ValidationError};
use crate::config::GateConfig;
use crate::gate::decision::{Redirect, RedirectStatus, RequestDescriptor, RoutingDecision};
use crate::gate::path::{PathPattern, PatternError};

/// Error raised when a policy cannot be built from configuration.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid gate rules: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// One protected namespace and the exact paths carved out of it.
#[derive(Debug, Clone)]
pub struct AccessRule {
    pub matcher: PathPattern,
    pub requires_auth: bool,
    pub exemptions: Vec<PathPattern>,
}

impl AccessRule {
    fn exempts(&self, path: &str) -> bool {
        self.exemptions.iter().any(|e| e.matches_exact(path))
    }

    fn protects(&self, path: &str) -> bool {
        self.requires_auth && self.matcher.matches_prefix(path)
    }
}

/// Immutable route-access policy.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    login_path: PathPattern,
    redirect_status: RedirectStatus,
}

impl AccessPolicy {
    /// Compile a validated policy. Any rule error rejects the whole policy.
    pub fn from_config(config: &GateConfig) -> Result<Self, PolicyError> {
        let errors = validate_gate(config);
        if !errors.is_empty() {
            return Err(PolicyError::Invalid(errors));
        }

        let login_path = PathPattern::parse(&config.login_path)?;

        let mut exemptions = vec![login_path.clone()];
        for raw in &config.exempt_paths {
            let pattern = PathPattern::parse(raw)?;
            if !pattern.same_path(&login_path) {
                exemptions.push(pattern);
            }
        }

        let rules = config
            .protected_prefixes
            .iter()
            .map(|raw| -> Result<AccessRule, PatternError> {
                Ok(AccessRule {
                    matcher: PathPattern::parse(raw)?,
                    requires_auth: true,
                    exemptions: exemptions.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            protected = ?config.protected_prefixes,
            exempt = exemptions.len(),
            login_path = %login_path,
            "Access policy compiled"
        );

        Ok(Self {
            rules,
            login_path,
            redirect_status: config.redirect_status,
        })
    }

    /// Decide whether a request may proceed.
    pub fn evaluate(&self, path: &str, is_authenticated: bool) -> RoutingDecision {
        if self.is_exempt(path) {
            return RoutingDecision::Allow;
        }
        if !self.is_protected(path) {
            return RoutingDecision::Allow;
        }
        if is_authenticated {
            return RoutingDecision::Allow;
        }
        RoutingDecision::RedirectTo(Redirect {
            target: self.login_path.as_str().to_string(),
            status: self.redirect_status,
        })
    }

    pub fn evaluate_request(&self, request: &RequestDescriptor) -> RoutingDecision {
        self.evaluate(&request.path, request.is_authenticated)
    }

    /// True when the path exactly matches an exemption of any rule.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.exempts(path)) || self.login_path.matches_exact(path)
    }

    /// True when the path falls under a protected prefix, exemptions ignored.
    pub fn is_protected(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.protects(path))
    }

    pub fn login_path(&self) -> &str {
        self.login_path.as_str()
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}
