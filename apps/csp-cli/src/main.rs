//! # csp-cli
//!
//! Command-line front end for `csp-policy`:
//! - `csp parse/normalize/merge` — inspect and combine policy strings
//! - `csp sources/check` — evaluate resources against a policy
//! - `csp config show/check` — work with a `csp.toml` policy file
//!
//! Logs go to stderr; stdout carries only command output.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Parse, merge, and evaluate Content-Security-Policy strings.
#[derive(Parser)]
#[command(name = "csp", version, about)]
struct Cli {
    /// Log library decisions at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Policy(commands::policy::PolicyCommands),
    /// Work with a policy config file.
    Config {
        /// Path to the TOML config file.
        path: std::path::PathBuf,
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

/// Install the stderr subscriber.
///
/// `RUST_LOG`, when set, replaces the default levels. `--verbose` always
/// raises the library to debug.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new("csp_policy=warn,csp=info")?,
    };
    let filter = if verbose {
        filter.add_directive("csp_policy=debug".parse()?)
    } else {
        filter
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match &cli.command {
        Commands::Policy(command) => commands::policy::execute(command),
        Commands::Config { path, command } => commands::config::execute(path, command),
    }
}
