//! Policy configuration files.
//!
//! A config file lists one or more policies that are merged in file order:
//!
//! ```toml
//! self-origin = "https://example.com"
//!
//! [[policy]]
//! source = "default-src 'self'; img-src cdn.example.com"
//!
//! [[policy]]
//! script-src = ["'self'", "https://cdn.example.com"]
//! upgrade-insecure-requests = true
//!
//! [[policy]]
//! [policy.directives]
//! "worker-src" = ["'self'"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::builder::PolicyBuilder;
use crate::error::PolicyError;
use crate::policy::Policy;

/// Top-level policy configuration (e.g., `csp.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawPolicyConfig")]
pub struct PolicyConfig {
    /// Origin that `'self'` resolves to when evaluating against this config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_origin: Option<Url>,

    /// Policies to merge, in order.
    #[serde(default, rename = "policy")]
    pub policies: Vec<PolicyEntry>,
}

/// Config as written, before each `[[policy]]` table is classified.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawPolicyConfig {
    #[serde(default)]
    self_origin: Option<Url>,
    #[serde(default)]
    policy: Vec<toml::Table>,
}

impl TryFrom<RawPolicyConfig> for PolicyConfig {
    type Error = String;

    fn try_from(raw: RawPolicyConfig) -> Result<Self, Self::Error> {
        let policies = raw
            .policy
            .into_iter()
            .enumerate()
            .map(|(index, table)| {
                PolicyEntry::try_from(table)
                    .map_err(|e| format!("policy entry {}: {}", index + 1, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            self_origin: raw.self_origin,
            policies,
        })
    }
}

/// One `[[policy]]` entry. Exactly one form per entry.
///
/// The form is chosen by key: `source`, then `directives`, otherwise the
/// well-known directive keys. Unknown keys are reported by name.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PolicyEntry {
    /// A policy header string, parsed leniently.
    Source(SourceEntry),
    /// An arbitrary directive map, validated token by token.
    Directives(DirectivesEntry),
    /// The well-known directives as individual keys.
    Named(PolicyBuilder),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectivesEntry {
    pub directives: BTreeMap<String, Vec<String>>,
}

impl TryFrom<toml::Table> for PolicyEntry {
    type Error = String;

    fn try_from(table: toml::Table) -> Result<Self, Self::Error> {
        let is_source = table.contains_key("source");
        let is_directives = table.contains_key("directives");
        let value = toml::Value::Table(table);
        let entry = if is_source {
            value.try_into::<SourceEntry>().map(PolicyEntry::Source)
        } else if is_directives {
            value.try_into::<DirectivesEntry>().map(PolicyEntry::Directives)
        } else {
            value.try_into::<PolicyBuilder>().map(PolicyEntry::Named)
        };
        entry.map_err(|e| e.message().to_string())
    }
}

impl<'de> Deserialize<'de> for PolicyEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = toml::Table::deserialize(deserializer)?;
        PolicyEntry::try_from(table).map_err(de::Error::custom)
    }
}

impl PolicyEntry {
    /// Build the policy this entry describes.
    pub fn build(&self) -> Result<Policy, PolicyError> {
        match self {
            PolicyEntry::Source(entry) => Policy::parse(&entry.source),
            PolicyEntry::Directives(entry) => Policy::from_map(entry.directives.clone()),
            PolicyEntry::Named(builder) => builder.build(),
        }
    }
}

impl PolicyConfig {
    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| PolicyError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(
            path = %path.display(),
            policies = config.policies.len(),
            "loaded policy config"
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Build every entry and merge them into one policy.
    ///
    /// An empty config yields the empty policy.
    pub fn policy(&self) -> Result<Policy, PolicyError> {
        let policies = self
            .policies
            .iter()
            .map(PolicyEntry::build)
            .collect::<Result<Vec<_>, _>>()?;
        Policy::merge(&policies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_entry_forms() {
        let config = PolicyConfig::from_toml_str(
            r#"
self-origin = "https://example.com"

[[policy]]
source = "default-src 'self'; img-src b.com"

[[policy]]
img-src = ["a.com"]
report-to = ["main"]
upgrade-insecure-requests = true

[[policy]]
[policy.directives]
"worker-src" = ["'self'"]
"#,
        )
        .unwrap();

        assert_eq!(config.policies.len(), 3);
        assert!(matches!(config.policies[0], PolicyEntry::Source(_)));
        assert!(matches!(config.policies[1], PolicyEntry::Named(_)));
        assert!(matches!(config.policies[2], PolicyEntry::Directives(_)));
        assert_eq!(
            config.self_origin.as_ref().map(Url::as_str),
            Some("https://example.com/")
        );

        let policy = config.policy().unwrap();
        assert_eq!(
            policy.to_source_string(),
            "default-src 'self'; img-src a.com b.com; report-to main; \
             upgrade-insecure-requests; worker-src 'self'"
        );
    }

    #[test]
    fn empty_config_is_empty_policy() {
        let config = PolicyConfig::from_toml_str("").unwrap();
        assert!(config.self_origin.is_none());
        assert!(config.policy().unwrap().is_empty());
    }

    #[test]
    fn unknown_keys_are_reported_with_entry_index() {
        let err = PolicyConfig::from_toml_str(
            r#"
[[policy]]
source = "default-src 'self'"

[[policy]]
bogus-src = ["a.com"]
"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("policy entry 2"), "{message}");
        assert!(message.contains("bogus-src"), "{message}");
    }

    #[test]
    fn mixed_forms_name_the_extra_key() {
        let err = PolicyConfig::from_toml_str(
            r#"
[[policy]]
source = "default-src 'self'"
img-src = ["a.com"]
"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("policy entry 1"), "{message}");
        assert!(message.contains("img-src"), "{message}");
    }

    #[test]
    fn wrong_value_type_names_the_entry() {
        let err = PolicyConfig::from_toml_str("[[policy]]\nsource = 42\n").unwrap_err();
        assert!(err.to_string().contains("policy entry 1"), "{err}");
    }

    #[test]
    fn bad_tokens_fail_when_building() {
        let config = PolicyConfig::from_toml_str(
            r#"
[[policy]]
[policy.directives]
"img-src" = ["a.com;b.com"]
"#,
        )
        .unwrap();
        assert!(matches!(
            config.policy(),
            Err(PolicyError::MalformedInput { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PolicyConfig::load(Path::new("/nonexistent/csp.toml")).unwrap_err();
        assert!(matches!(err, PolicyError::Io { .. }));
    }
}
