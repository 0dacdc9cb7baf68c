// token.rs — Directive argument validation and keyword literals.
//
// A token is one space-delimited argument of a directive: a host, a
// scheme+host URI, or a quoted keyword. Tokens supplied programmatically
// must not contain whitespace/control characters or semicolons, since
// either would change how the serialized policy splits back apart.

use crate::error::PolicyError;

/// Keyword that denies every source. Absorbs all other tokens in a source list.
pub const NONE: &str = "'none'";

/// Wildcard source. Absorbs all other tokens (except `'none'`) in a source list.
pub const WILDCARD: &str = "*";

/// Keyword matching the caller-supplied self origin.
pub const SELF: &str = "'self'";

/// Validate a single directive argument.
///
/// Rejects the empty token, any character at or below U+0020 (space and the
/// C0 controls), DEL (U+007F), and `;`. An empty token would serialize as a
/// stray space that the parser cannot read back.
pub fn validate_token(token: &str) -> Result<(), PolicyError> {
    if token.is_empty() {
        return Err(PolicyError::MalformedInput {
            token: String::new(),
            reason: "empty token".to_string(),
        });
    }
    for (index, c) in token.char_indices() {
        if (c as u32) <= 0x20 || c == '\u{7f}' {
            return Err(PolicyError::MalformedInput {
                token: token.to_string(),
                reason: format!("control character U+{:04X} at byte {}", c as u32, index),
            });
        }
        if c == ';' {
            return Err(PolicyError::MalformedInput {
                token: token.to_string(),
                reason: format!("semicolon at byte {}", index),
            });
        }
    }
    Ok(())
}
