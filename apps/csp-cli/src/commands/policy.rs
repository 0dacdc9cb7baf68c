// policy.rs — Subcommands that take policy strings on the command line.

use anyhow::Context;
use clap::Subcommand;
use csp_policy::Policy;
use url::Url;

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Parse a policy and list its normalized directives.
    Parse {
        /// Policy string, e.g. "default-src 'self'; img-src cdn.example.com".
        policy: String,
        /// Reject empty clauses, empty tokens, and malformed tokens.
        #[arg(long)]
        strict: bool,
        /// Print the directive map as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical form of a policy.
    Normalize {
        policy: String,
    },
    /// Merge policies in order and print the canonical result.
    Merge {
        #[arg(required = true)]
        policies: Vec<String>,
    },
    /// List the sources allowed for a category (e.g., "img", "script").
    Sources {
        policy: String,
        category: String,
    },
    /// Check whether a resource may load. Exits non-zero when blocked.
    Check {
        policy: String,
        /// Bare category, e.g. "img".
        category: String,
        /// Resource URL.
        resource: String,
        /// Origin that 'self' refers to.
        #[arg(long)]
        self_origin: Option<String>,
        /// Print the decision as JSON.
        #[arg(long)]
        json: bool,
    },
}

pub(crate) fn parse_url(value: &str) -> anyhow::Result<Url> {
    Url::parse(value).with_context(|| format!("invalid URL '{}'", value))
}

pub fn execute(cmd: &PolicyCommands) -> anyhow::Result<()> {
    match cmd {
        PolicyCommands::Parse {
            policy,
            strict,
            json,
        } => {
            let policy = if *strict {
                Policy::parse_strict(policy)?
            } else {
                Policy::parse(policy)?
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(policy.directives())?);
            } else {
                super::print_directives(&policy);
            }
            Ok(())
        }

        PolicyCommands::Normalize { policy } => {
            let parsed = Policy::parse(policy)?;
            let canonical = Policy::from_map(parsed.directives().clone())
                .context("policy contains tokens that cannot be re-serialized")?;
            println!("{}", canonical);
            Ok(())
        }

        PolicyCommands::Merge { policies } => {
            let parsed = policies
                .iter()
                .map(|p| Policy::parse(p))
                .collect::<Result<Vec<_>, _>>()?;
            let merged = Policy::merge(&parsed)?;
            tracing::info!("merged {} policies", parsed.len());
            println!("{}", merged);
            Ok(())
        }

        PolicyCommands::Sources { policy, category } => {
            let policy = Policy::parse(policy)?;
            for source in policy.allowed_sources(category)? {
                println!("{}", source);
            }
            Ok(())
        }

        PolicyCommands::Check {
            policy,
            category,
            resource,
            self_origin,
            json,
        } => {
            let policy = Policy::parse(policy)?;
            let resource = parse_url(resource)?;
            let self_origin = self_origin.as_deref().map(parse_url).transpose()?;
            let decision = policy.evaluate(category, &resource, self_origin.as_ref())?;
            super::report_decision(decision, *json)
        }
    }
}
