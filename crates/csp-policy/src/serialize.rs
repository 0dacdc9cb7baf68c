// serialize.rs — Canonical string form and serde integration.
//
// A parsed Policy renders as its original (trimmed) input. Any other Policy
// renders canonically: directives in name order, tokens space-separated,
// clauses joined with "; ", no trailing delimiter. Either way the string is
// computed at most once per Policy.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::policy::Policy;

fn render(policy: &Policy) -> String {
    let mut out = String::new();
    for (index, (name, tokens)) in policy.directives.iter().enumerate() {
        if index > 0 {
            out.push_str("; ");
        }
        out.push_str(name);
        for token in tokens {
            out.push(' ');
            out.push_str(token);
        }
    }
    out
}

impl Policy {
    /// The policy as a header value.
    ///
    /// Returns the original input for parsed policies and the canonical
    /// rendering otherwise.
    pub fn to_source_string(&self) -> &str {
        self.source.get_or_init(|| render(self))
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_source_string())
    }
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_source_string())
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Policy::parse(&source).map_err(de::Error::custom)
    }
}
