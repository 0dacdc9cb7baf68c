//! # csp-policy
//!
//! Model, parse, canonicalize, merge, and evaluate Content-Security-Policy
//! directive strings such as
//! `default-src 'self'; img-src cdn.example.com; upgrade-insecure-requests`.
//!
//! A [`Policy`] maps directive names to normalized token lists. Policies are
//! immutable values: parsing, building, and merging each produce a new one.
//!
//! ## Key invariants
//!
//! - **Source lists are sets**: for directives ending in `-src`, `'none'`
//!   absorbs every other token, then `*` absorbs every other token, otherwise
//!   tokens are deduplicated and sorted.
//! - **Parsed text round-trips**: a policy produced by [`Policy::parse`]
//!   serializes back to exactly its (trimmed) input. Built and merged
//!   policies serialize canonically.
//! - **Constructed tokens are well-formed**: [`Policy::from_map`],
//!   [`PolicyBuilder`], and [`Policy::merge`] reject tokens containing
//!   control characters, spaces, or semicolons. The lenient parser does not.
//! - **`'none'` and `*` win**: evaluation short-circuits on them before any
//!   host matching.
//!
//! ```
//! use csp_policy::Policy;
//! use url::Url;
//!
//! let policy: Policy = "default-src 'self'; img-src cdn.example.com".parse().unwrap();
//! let origin = Url::parse("https://example.com").unwrap();
//! let image = Url::parse("https://cdn.example.com/logo.png").unwrap();
//! assert!(policy.is_allowed_source("img", &image, Some(&origin)).unwrap());
//! assert!(policy.check_source("script", &image, Some(&origin)).is_err());
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod evaluate;
mod merge;
pub mod normalize;
mod parse;
pub mod policy;
mod serialize;
pub mod token;

pub use builder::PolicyBuilder;
pub use config::{PolicyConfig, PolicyEntry};
pub use error::PolicyError;
pub use evaluate::{SourceDecision, SourceRequest, Violation};
pub use normalize::{is_source_directive, normalize_tokens};
pub use policy::{
    Directive, Policy, CONNECT_SRC, DEFAULT_SRC, FONT_SRC, FRAME_ANCESTORS, IMG_SRC, MANIFEST_SRC,
    MEDIA_SRC, NAVIGATE_TO, REPORT_TO, REPORT_URI, SCRIPT_SRC, STYLE_SRC,
    UPGRADE_INSECURE_REQUESTS,
};
pub use token::{validate_token, NONE, SELF, WILDCARD};
