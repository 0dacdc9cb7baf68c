// error.rs — Error types for policy construction, parsing, and evaluation.

use std::path::PathBuf;

use thiserror::Error;

use crate::evaluate::Violation;

/// Errors that can occur during policy operations.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A directive argument contains a control character or a semicolon.
    #[error("malformed directive token {token:?}: {reason}")]
    MalformedInput { token: String, reason: String },

    /// A policy string does not satisfy the strict structural grammar.
    #[error("cannot parse policy {input:?}: {reason}")]
    Format { input: String, reason: String },

    /// The caller passed an argument the operation does not accept.
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// A resource was denied by a policy.
    #[error(transparent)]
    Violation(#[from] Box<Violation>),

    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid.
    #[error("invalid policy config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl PolicyError {
    /// The violation carried by this error, if it is a denial.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            PolicyError::Violation(v) => Some(v),
            _ => None,
        }
    }
}
