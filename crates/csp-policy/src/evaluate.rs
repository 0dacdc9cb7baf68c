// evaluate.rs — Decide whether a resource may load under a policy.
//
// Evaluation order for a category (e.g., "img"):
//
// 1. Resolve "<category>-src", falling back to "default-src", else no sources.
// 2. Exactly ['none'] → deny.
// 3. Exactly ['*'] → allow.
// 4. 'self' present and self origin host == resource host → allow.
// 5. Any token matching the resource → allow:
//    - "scheme://host..." tokens match on scheme AND host,
//    - any other token matches the host verbatim.
// 6. Otherwise deny.
//
// Hosts are compared exactly as the URL parser reports them. Bare-host
// tokens are never case-folded.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::error::PolicyError;
use crate::normalize::{is_source_directive, SOURCE_SUFFIX};
use crate::policy::{Policy, DEFAULT_SRC};
use crate::token::{NONE, SELF, WILDCARD};

/// A resource denied by a policy.
///
/// Only produced by evaluation; carries the denying policy so callers can
/// report which header blocked the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{category} resource '{resource}' is not allowed by policy \"{policy}\"")]
pub struct Violation {
    category: String,
    resource: Url,
    policy: Policy,
}

impl Violation {
    /// The bare category that was attempted (e.g., "img").
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The resource that was attempted.
    pub fn resource(&self) -> &Url {
        &self.resource
    }

    /// The policy that denied the resource.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

/// Outcome of [`Policy::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SourceDecision {
    /// The resource may load.
    Allow,
    /// The resource is blocked.
    Deny { violation: Box<Violation> },
}

impl SourceDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, SourceDecision::Allow)
    }
}

/// A resource check, convenient for callers that batch requests (e.g., from JSON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRequest {
    /// Bare category, without the "-src" suffix.
    pub category: String,
    /// The resource being loaded.
    pub resource: Url,
    /// Origin that `'self'` resolves to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_origin: Option<Url>,
}

fn host(url: &Url) -> &str {
    url.host_str().unwrap_or("")
}

fn matches_source(token: &str, resource: &Url) -> bool {
    if !token.contains("://") {
        return token == host(resource);
    }
    match Url::parse(token) {
        Ok(source) => source.scheme() == resource.scheme() && host(&source) == host(resource),
        Err(err) => {
            tracing::warn!(token, error = %err, "source token is not a valid URL; skipping");
            false
        }
    }
}

impl Policy {
    /// Sources allowed for a bare `category` such as "img" or "script".
    ///
    /// Falls back to `default-src` when the category has no directive of its
    /// own, and to no sources at all when neither exists.
    pub fn allowed_sources(&self, category: &str) -> Result<&[String], PolicyError> {
        if is_source_directive(category) {
            return Err(PolicyError::InvalidArgument {
                argument: category.to_string(),
                reason: format!(
                    "expected a bare category, not a directive name ending in '{}'",
                    SOURCE_SUFFIX
                ),
            });
        }
        let name = format!("{}{}", category, SOURCE_SUFFIX);
        Ok(self
            .directive(&name)
            .or_else(|| self.directive(DEFAULT_SRC))
            .unwrap_or(&[]))
    }

    /// Whether `resource` may load as `category`.
    pub fn is_allowed_source(
        &self,
        category: &str,
        resource: &Url,
        self_origin: Option<&Url>,
    ) -> Result<bool, PolicyError> {
        let sources = self.allowed_sources(category)?;

        if sources == [NONE] {
            return Ok(false);
        }
        if sources == [WILDCARD] {
            return Ok(true);
        }
        if let Some(origin) = self_origin {
            if sources.iter().any(|s| s == SELF) && host(origin) == host(resource) {
                return Ok(true);
            }
        }
        Ok(sources.iter().any(|s| matches_source(s, resource)))
    }

    /// Evaluate a resource, returning the violation on denial instead of an error.
    pub fn evaluate(
        &self,
        category: &str,
        resource: &Url,
        self_origin: Option<&Url>,
    ) -> Result<SourceDecision, PolicyError> {
        if self.is_allowed_source(category, resource, self_origin)? {
            tracing::debug!(category, %resource, "source allowed");
            return Ok(SourceDecision::Allow);
        }
        tracing::debug!(category, %resource, policy = %self, "source denied");
        Ok(SourceDecision::Deny {
            violation: Box::new(Violation {
                category: category.to_string(),
                resource: resource.clone(),
                policy: self.clone(),
            }),
        })
    }

    /// Evaluate a [`SourceRequest`].
    pub fn evaluate_request(
        &self,
        request: &SourceRequest,
    ) -> Result<SourceDecision, PolicyError> {
        self.evaluate(
            &request.category,
            &request.resource,
            request.self_origin.as_ref(),
        )
    }

    /// Enforce a resource: `Ok(())` when allowed, [`PolicyError::Violation`] when denied.
    pub fn check_source(
        &self,
        category: &str,
        resource: &Url,
        self_origin: Option<&Url>,
    ) -> Result<(), PolicyError> {
        match self.evaluate(category, resource, self_origin)? {
            SourceDecision::Allow => Ok(()),
            SourceDecision::Deny { violation } => Err(PolicyError::Violation(violation)),
        }
    }
}
