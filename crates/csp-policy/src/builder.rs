// builder.rs — Named-field construction for the well-known directives.
//
// Each field maps one-to-one to a directive; `None` omits the directive.
// The struct doubles as the shape of a `[[policy]]` entry in config files,
// hence the kebab-case serde names.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::policy::{
    Policy, CONNECT_SRC, DEFAULT_SRC, FONT_SRC, FRAME_ANCESTORS, IMG_SRC, MANIFEST_SRC, MEDIA_SRC,
    NAVIGATE_TO, REPORT_TO, REPORT_URI, SCRIPT_SRC, STYLE_SRC, UPGRADE_INSECURE_REQUESTS,
};

/// Builder for policies made of the well-known directives.
///
/// ```
/// use csp_policy::PolicyBuilder;
///
/// let policy = PolicyBuilder::new()
///     .default_src(["'self'"])
///     .img_src(["cdn.example.com", "'self'"])
///     .upgrade_insecure_requests(true)
///     .build()
///     .unwrap();
/// assert_eq!(
///     policy.to_source_string(),
///     "default-src 'self'; img-src 'self' cdn.example.com; upgrade-insecure-requests"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PolicyBuilder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_src: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_ancestors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_to: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_uri: Option<Vec<String>>,
    /// When true, adds `upgrade-insecure-requests` with no arguments.
    #[serde(default)]
    pub upgrade_insecure_requests: bool,
}

macro_rules! setters {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field<I, T>(mut self, tokens: I) -> Self
            where
                I: IntoIterator<Item = T>,
                T: Into<String>,
            {
                self.$field = Some(tokens.into_iter().map(Into::into).collect());
                self
            }
        )*
    };
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    setters!(
        connect_src,
        default_src,
        font_src,
        img_src,
        manifest_src,
        media_src,
        script_src,
        style_src,
        frame_ancestors,
        navigate_to,
        report_to,
        report_uri,
    );

    pub fn upgrade_insecure_requests(mut self, enabled: bool) -> Self {
        self.upgrade_insecure_requests = enabled;
        self
    }

    /// Whether no directive has been set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate and normalize the configured directives into a [`Policy`].
    pub fn build(&self) -> Result<Policy, PolicyError> {
        let named = [
            (CONNECT_SRC, &self.connect_src),
            (DEFAULT_SRC, &self.default_src),
            (FONT_SRC, &self.font_src),
            (IMG_SRC, &self.img_src),
            (MANIFEST_SRC, &self.manifest_src),
            (MEDIA_SRC, &self.media_src),
            (SCRIPT_SRC, &self.script_src),
            (STYLE_SRC, &self.style_src),
            (FRAME_ANCESTORS, &self.frame_ancestors),
            (NAVIGATE_TO, &self.navigate_to),
            (REPORT_TO, &self.report_to),
            (REPORT_URI, &self.report_uri),
        ];
        let mut directives: Vec<(&str, Vec<String>)> = named
            .into_iter()
            .filter_map(|(name, tokens)| tokens.clone().map(|t| (name, t)))
            .collect();
        if self.upgrade_insecure_requests {
            directives.push((UPGRADE_INSECURE_REQUESTS, Vec::new()));
        }
        Policy::from_map(directives)
    }
}
