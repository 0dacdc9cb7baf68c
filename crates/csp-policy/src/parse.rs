// parse.rs — Policy string parser.
//
// Grammar: clauses separated by exactly "; ", each clause a name followed
// by single-space separated tokens. The lenient parser is total: any string
// yields a Policy, and that Policy remembers the trimmed input so it
// serializes back byte-for-byte. Tokens are normalized but NOT validated
// here, so a parsed Policy may hold tokens that `Policy::from_map` would
// reject. `parse_strict` adds the structural and token checks.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::PolicyError;
use crate::normalize::normalize_tokens;
use crate::policy::Policy;
use crate::token::validate_token;

/// Clause delimiter. A bare ";" or ";" followed by other whitespace is not a split point.
const CLAUSE_DELIMITER: &str = "; ";
const TOKEN_DELIMITER: char = ' ';

/// Split trimmed policy text into (name, raw tokens) clauses, in input order.
fn split_clauses(trimmed: &str) -> Vec<(&str, Vec<&str>)> {
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split(CLAUSE_DELIMITER)
        .map(|clause| {
            let mut parts = clause.split(TOKEN_DELIMITER);
            // split() always yields at least one element.
            let name = parts.next().unwrap_or_default();
            (name, parts.collect())
        })
        .collect()
}

fn build(clauses: Vec<(&str, Vec<&str>)>) -> BTreeMap<String, Vec<String>> {
    let mut directives = BTreeMap::new();
    for (name, tokens) in clauses {
        directives.insert(name.to_string(), normalize_tokens(name, &tokens));
    }
    directives
}

impl Policy {
    /// Parse a policy string.
    ///
    /// Surrounding whitespace is trimmed; the empty string yields the empty
    /// policy. A repeated directive name keeps its last occurrence. The
    /// returned policy serializes to exactly the trimmed input.
    pub fn parse(input: &str) -> Result<Self, PolicyError> {
        let trimmed = input.trim();
        let directives = build(split_clauses(trimmed));
        tracing::debug!(directives = directives.len(), "parsed policy");
        Ok(Self::from_normalized(directives, Some(trimmed.to_string())))
    }

    /// Non-failing variant of [`Policy::parse`].
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Parse a policy string, rejecting anything the lenient parser would
    /// only accept by accident: empty clauses, empty directive names,
    /// empty tokens (consecutive spaces), and tokens with control
    /// characters or semicolons.
    pub fn parse_strict(input: &str) -> Result<Self, PolicyError> {
        let trimmed = input.trim();
        let clauses = split_clauses(trimmed);
        for (index, (name, tokens)) in clauses.iter().enumerate() {
            if name.is_empty() {
                return Err(PolicyError::Format {
                    input: trimmed.to_string(),
                    reason: format!("clause {} has no directive name", index + 1),
                });
            }
            for token in tokens {
                if token.is_empty() {
                    return Err(PolicyError::Format {
                        input: trimmed.to_string(),
                        reason: format!("directive '{}' has an empty token", name),
                    });
                }
                if let Err(err) = validate_token(token) {
                    return Err(PolicyError::Format {
                        input: trimmed.to_string(),
                        reason: format!("directive '{}': {}", name, err),
                    });
                }
            }
        }
        Ok(Self::from_normalized(build(clauses), Some(trimmed.to_string())))
    }
}

impl FromStr for Policy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DEFAULT_SRC, IMG_SRC, REPORT_TO, UPGRADE_INSECURE_REQUESTS};

    #[test]
    fn parses_clauses_and_normalizes() {
        let policy = Policy::parse("default-src b.com 'self' b.com; report-to z a z").unwrap();
        assert_eq!(policy.directive(DEFAULT_SRC).unwrap(), ["'self'", "b.com"]);
        assert_eq!(policy.directive(REPORT_TO).unwrap(), ["z", "a", "z"]);
    }

    #[test]
    fn round_trips_original_text() {
        let input = "script-src https://b.com 'none' a.com; upgrade-insecure-requests";
        let policy = Policy::parse(input).unwrap();
        assert_eq!(policy.to_source_string(), input);
        assert_eq!(policy.directive("script-src").unwrap(), ["'none'"]);
        assert_eq!(policy.directive(UPGRADE_INSECURE_REQUESTS).unwrap().len(), 0);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let policy = Policy::parse("  \n default-src 'self'\t ").unwrap();
        assert_eq!(policy.to_source_string(), "default-src 'self'");
    }

    #[test]
    fn empty_input_is_empty_policy() {
        let policy = Policy::parse("   ").unwrap();
        assert!(policy.is_empty());
        assert!(policy.has_cached_source());
        assert_eq!(policy.to_source_string(), "");
    }

    #[test]
    fn last_repeated_directive_wins() {
        let policy = Policy::parse("img-src a.com; img-src b.com").unwrap();
        assert_eq!(policy.directive(IMG_SRC).unwrap(), ["b.com"]);
    }

    #[test]
    fn only_semicolon_space_splits_clauses() {
        let policy = Policy::parse("img-src a.com;default-src b.com").unwrap();
        assert_eq!(policy.directives().len(), 1);
        assert_eq!(
            policy.directive(IMG_SRC).unwrap(),
            ["a.com;default-src", "b.com"]
        );
    }

    #[test]
    fn lenient_parse_accepts_tokens_from_map_rejects() {
        let policy = Policy::parse("img-src a.com;b.com").unwrap();
        let tokens = policy.directive(IMG_SRC).unwrap().to_vec();
        assert_eq!(tokens, ["a.com;b.com"]);
        assert!(matches!(
            Policy::from_map([(IMG_SRC, tokens)]),
            Err(PolicyError::MalformedInput { .. })
        ));
    }

    #[test]
    fn consecutive_spaces_yield_empty_token() {
        let policy = Policy::parse("report-to a  b").unwrap();
        assert_eq!(policy.directive(REPORT_TO).unwrap(), ["a", "", "b"]);
    }

    #[test]
    fn try_parse_and_from_str_agree_with_parse() {
        let input = "default-src 'self'; img-src *";
        let a = Policy::try_parse(input).unwrap();
        let b: Policy = input.parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Policy::parse(input).unwrap());
    }

    #[test]
    fn strict_accepts_well_formed_policy() {
        let input = "default-src 'self'; img-src a.com b.com; upgrade-insecure-requests";
        let policy = Policy::parse_strict(input).unwrap();
        assert_eq!(policy, Policy::parse(input).unwrap());
        assert_eq!(policy.to_source_string(), input);
    }

    #[test]
    fn strict_rejects_semicolon_in_token() {
        let err = Policy::parse_strict("img-src a.com;b.com").unwrap_err();
        assert!(matches!(err, PolicyError::Format { .. }));
    }

    #[test]
    fn strict_rejects_empty_clause_and_token() {
        assert!(matches!(
            Policy::parse_strict("img-src a.com; ; default-src b.com"),
            Err(PolicyError::Format { .. })
        ));
        assert!(matches!(
            Policy::parse_strict("img-src a.com  b.com"),
            Err(PolicyError::Format { .. })
        ));
    }

    #[test]
    fn strict_accepts_empty_input() {
        assert!(Policy::parse_strict("").unwrap().is_empty());
    }
}
