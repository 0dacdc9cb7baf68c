// normalize.rs — Canonical token lists for directives.
//
// Source-list directives (names ending in "-src") are treated as sets:
// `'none'` absorbs everything, then `*` absorbs everything else, otherwise
// the distinct tokens are sorted. All other directives (report-to,
// upgrade-insecure-requests, ...) keep their arguments verbatim.

use std::collections::BTreeSet;

use crate::token::{NONE, WILDCARD};

/// Suffix that marks a fallback-category (source list) directive.
pub const SOURCE_SUFFIX: &str = "-src";

/// Whether `name` is a source-list directive subject to set normalization.
pub fn is_source_directive(name: &str) -> bool {
    name.ends_with(SOURCE_SUFFIX)
}

/// Produce the canonical token list for directive `name`.
///
/// `'none'` is checked before `*`, so a list containing both denies.
pub fn normalize_tokens<S: AsRef<str>>(name: &str, tokens: &[S]) -> Vec<String> {
    if !is_source_directive(name) {
        return tokens.iter().map(|t| t.as_ref().to_string()).collect();
    }

    if tokens.iter().any(|t| t.as_ref() == NONE) {
        if tokens.len() > 1 {
            tracing::debug!(directive = name, "'none' absorbs {} other token(s)", tokens.len() - 1);
        }
        return vec![NONE.to_string()];
    }
    if tokens.iter().any(|t| t.as_ref() == WILDCARD) {
        return vec![WILDCARD.to_string()];
    }

    // BTreeSet<&str> orders by bytes, which for UTF-8 is code-point order.
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
