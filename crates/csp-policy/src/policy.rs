// policy.rs — The immutable Policy model.
//
// A Policy maps directive names to normalized token lists. Policies are
// value objects: every transformation (merge, rebuild) allocates a new one.
// The only interior state is memoized derived data (serialized source,
// sorted directive view), held in `OnceLock` so concurrent readers can
// share a Policy without further synchronization.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::normalize::normalize_tokens;
use crate::token::validate_token;

pub const CONNECT_SRC: &str = "connect-src";
pub const DEFAULT_SRC: &str = "default-src";
pub const FONT_SRC: &str = "font-src";
pub const IMG_SRC: &str = "img-src";
pub const MANIFEST_SRC: &str = "manifest-src";
pub const MEDIA_SRC: &str = "media-src";
pub const SCRIPT_SRC: &str = "script-src";
pub const STYLE_SRC: &str = "style-src";
pub const FRAME_ANCESTORS: &str = "frame-ancestors";
pub const NAVIGATE_TO: &str = "navigate-to";
pub const REPORT_TO: &str = "report-to";
pub const REPORT_URI: &str = "report-uri";
pub const UPGRADE_INSECURE_REQUESTS: &str = "upgrade-insecure-requests";

/// One `name token token ...` clause of a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Directive name, case-sensitive (e.g., "script-src").
    pub name: String,
    /// Arguments in canonical order.
    pub tokens: Vec<String>,
}

impl Directive {
    pub fn new<I, T>(name: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

/// A Content-Security-Policy: directive name → normalized tokens.
///
/// Equality compares directives only; whether a Policy remembers the string
/// it was parsed from does not affect `==`.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub(crate) directives: BTreeMap<String, Vec<String>>,
    /// Serialized form. Pre-filled by the parser with the original input.
    pub(crate) source: OnceLock<String>,
    pub(crate) directive_list: OnceLock<Vec<Directive>>,
    /// True when `source` holds parser input rather than a canonical rendering.
    pub(crate) parsed: bool,
}

impl Policy {
    /// The policy with no directives. Serializes to the empty string.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a policy from already-normalized directives.
    pub(crate) fn from_normalized(
        directives: BTreeMap<String, Vec<String>>,
        source: Option<String>,
    ) -> Self {
        let parsed = source.is_some();
        let cell = OnceLock::new();
        if let Some(source) = source {
            let _ = cell.set(source);
        }
        Self {
            directives,
            source: cell,
            directive_list: OnceLock::new(),
            parsed,
        }
    }

    /// Build a policy from a directive map.
    ///
    /// Every token is validated (see [`validate_token`]) in iteration order
    /// of `directives`, and every token list is normalized. A repeated name
    /// in the input replaces the earlier entry. Empty directive names are
    /// rejected, since they cannot be serialized and parsed back.
    pub fn from_map<I, K, V, T>(directives: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut normalized = BTreeMap::new();
        for (name, tokens) in directives {
            let name: String = name.into();
            if name.is_empty() {
                return Err(PolicyError::MalformedInput {
                    token: name,
                    reason: "empty directive name".to_string(),
                });
            }
            let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
            for token in &tokens {
                validate_token(token)?;
            }
            let tokens = normalize_tokens(&name, &tokens);
            normalized.insert(name, tokens);
        }
        Ok(Self::from_normalized(normalized, None))
    }

    /// Build a policy from a sequence of directives.
    ///
    /// Equivalent to merging one single-directive policy per input, so a
    /// repeated source-list directive accumulates its tokens while any other
    /// repeated directive keeps the last occurrence.
    pub fn from_directives<I>(directives: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = Directive>,
    {
        let singles = directives
            .into_iter()
            .map(|d| Self::from_map([(d.name, d.tokens)]))
            .collect::<Result<Vec<_>, _>>()?;
        Self::merge(&singles)
    }

    /// Read-only view of the directive map, iterated in name order.
    pub fn directives(&self) -> &BTreeMap<String, Vec<String>> {
        &self.directives
    }

    /// Tokens of a single directive, if present.
    pub fn directive(&self, name: &str) -> Option<&[String]> {
        self.directives.get(name).map(Vec::as_slice)
    }

    /// Directives as a list sorted by name. Computed once per policy.
    pub fn directive_list(&self) -> &[Directive] {
        self.directive_list.get_or_init(|| {
            self.directives
                .iter()
                .map(|(name, tokens)| Directive::new(name.clone(), tokens.iter().cloned()))
                .collect()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Whether this policy serializes back to the exact string it was parsed from.
    pub fn has_cached_source(&self) -> bool {
        self.parsed
    }
}

impl PartialEq for Policy {
    fn eq(&self, other: &Self) -> bool {
        self.directives == other.directives
    }
}

impl Eq for Policy {}
