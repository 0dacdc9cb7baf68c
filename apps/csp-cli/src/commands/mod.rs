pub mod config;
pub mod policy;

use csp_policy::{Policy, SourceDecision};

/// Print an evaluation result and fail the command on denial.
pub(crate) fn report_decision(decision: SourceDecision, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    }
    match decision {
        SourceDecision::Allow => {
            if !json {
                println!("allow");
            }
            Ok(())
        }
        SourceDecision::Deny { violation } => {
            if !json {
                println!("deny: {}", violation);
            }
            anyhow::bail!("resource blocked by policy")
        }
    }
}

/// Print one directive per line in name order.
pub(crate) fn print_directives(policy: &Policy) {
    for directive in policy.directive_list() {
        if directive.tokens.is_empty() {
            println!("{}", directive.name);
        } else {
            println!("{} {}", directive.name, directive.tokens.join(" "));
        }
    }
}
