// merge.rs — Combine several policies into one.
//
// Source-list directives union across all inputs; every other directive is
// last-writer-wins. The result is rebuilt through `Policy::from_map`, so it
// is re-validated, re-normalized, and never carries a cached source.

use std::collections::BTreeMap;

use crate::error::PolicyError;
use crate::normalize::is_source_directive;
use crate::policy::Policy;

impl Policy {
    /// Merge `policies` in order.
    ///
    /// Fails with [`PolicyError::MalformedInput`] if any input carries a
    /// token that does not validate, which can only happen for parsed inputs.
    pub fn merge(policies: &[Policy]) -> Result<Policy, PolicyError> {
        let mut accumulated: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for policy in policies {
            for (name, tokens) in &policy.directives {
                if is_source_directive(name) {
                    let entry = accumulated.entry(name.as_str()).or_default();
                    for token in tokens {
                        if !entry.contains(&token.as_str()) {
                            entry.push(token.as_str());
                        }
                    }
                } else {
                    accumulated.insert(name.as_str(), tokens.iter().map(String::as_str).collect());
                }
            }
        }
        tracing::debug!(
            inputs = policies.len(),
            directives = accumulated.len(),
            "merged policies"
        );
        Policy::from_map(accumulated)
    }
}
