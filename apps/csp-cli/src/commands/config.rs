// config.rs — Subcommands operating on a csp.toml policy file.

use std::path::Path;

use clap::Subcommand;
use csp_policy::PolicyConfig;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged policy described by the file.
    Show {
        /// List directives one per line instead of as a header value.
        #[arg(long)]
        list: bool,
    },
    /// Check a resource against the merged policy, using the file's self-origin.
    Check {
        category: String,
        resource: String,
        /// Overrides the file's self-origin.
        #[arg(long)]
        self_origin: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

pub fn execute(path: &Path, cmd: &ConfigCommands) -> anyhow::Result<()> {
    let config = PolicyConfig::load(path)?;
    let policy = config.policy()?;
    tracing::info!(
        "loaded {} policy entries from {}",
        config.policies.len(),
        path.display()
    );

    match cmd {
        ConfigCommands::Show { list } => {
            if *list {
                super::print_directives(&policy);
            } else {
                println!("{}", policy);
            }
            Ok(())
        }

        ConfigCommands::Check {
            category,
            resource,
            self_origin,
            json,
        } => {
            let resource = super::policy::parse_url(resource)?;
            let self_origin = match self_origin {
                Some(origin) => Some(super::policy::parse_url(origin)?),
                None => config.self_origin.clone(),
            };
            let decision = policy.evaluate(category, &resource, self_origin.as_ref())?;
            super::report_decision(decision, *json)
        }
    }
}
