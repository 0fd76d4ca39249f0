use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Tags the cleaner always drops together with their content. Allow-listing
/// them would contradict the cleaner's content-stripping pass.
const FORBIDDEN_TAGS: [&str; 2] = ["script", "style"];

/// URL schemes that execute script when dereferenced.
const FORBIDDEN_SCHEMES: [&str; 2] = ["javascript", "vbscript"];

/// Allow-list policy governing which markup survives a scan.
///
/// A policy is an immutable value for the duration of a scan; the scanner
/// never mutates it and a shared policy may back any number of concurrent
/// scans. Directive changes require building a new policy value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Tags that may remain in cleaned output.
    #[serde(default = "default_allowed_tags")]
    pub allowed_tags: HashSet<String>,
    /// Attributes that may remain on any allowed tag.
    #[serde(default = "default_allowed_attributes")]
    pub allowed_attributes: HashSet<String>,
    /// URL schemes accepted in href/src-style attribute values.
    #[serde(default = "default_url_schemes")]
    pub url_schemes: HashSet<String>,
    /// Keep HTML comments instead of stripping them.
    #[serde(default)]
    pub preserve_comments: bool,
    /// Emit rel="nofollow" on anchors in cleaned output.
    #[serde(default)]
    pub nofollow_anchors: bool,
    /// Upper bound on the byte length of a single input value.
    #[serde(default = "default_max_input_size")]
    pub max_input_size: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allowed_tags: default_allowed_tags(),
            allowed_attributes: default_allowed_attributes(),
            url_schemes: default_url_schemes(),
            preserve_comments: false,
            nofollow_anchors: false,
            max_input_size: default_max_input_size(),
        }
    }
}

impl Policy {
    /// Parse and validate a policy from its JSON representation.
    pub fn from_json(text: &str) -> Result<Self, PolicyError> {
        let policy: Policy = serde_json::from_str(text)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Serialize the policy to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the policy for inconsistent directives.
    ///
    /// Every scan entry point validates the policy once before scanning, so
    /// the engine itself can assume a well-formed policy.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_input_size == 0 {
            return Err(PolicyError::invalid(
                "max_input_size must be greater than zero",
            ));
        }
        for tag in &self.allowed_tags {
            if !is_valid_name(tag) {
                return Err(PolicyError::invalid(format!(
                    "tag name {tag:?} is malformed"
                )));
            }
            if FORBIDDEN_TAGS.contains(&tag.as_str()) {
                return Err(PolicyError::invalid(format!(
                    "the <{tag}> tag cannot be allow-listed"
                )));
            }
        }
        for attribute in &self.allowed_attributes {
            if !is_valid_name(attribute) {
                return Err(PolicyError::invalid(format!(
                    "attribute name {attribute:?} is malformed"
                )));
            }
            if attribute.starts_with("on") {
                return Err(PolicyError::invalid(format!(
                    "event handler attribute {attribute:?} cannot be allow-listed"
                )));
            }
            if attribute == "rel" {
                return Err(PolicyError::invalid(
                    "the rel attribute is managed by the scanner and cannot be allow-listed",
                ));
            }
        }
        for scheme in &self.url_schemes {
            if !is_valid_scheme(scheme) {
                return Err(PolicyError::invalid(format!(
                    "URL scheme {scheme:?} is malformed"
                )));
            }
            if FORBIDDEN_SCHEMES.contains(&scheme.as_str()) {
                return Err(PolicyError::invalid(format!(
                    "the {scheme}: scheme cannot be allow-listed"
                )));
            }
        }
        Ok(())
    }
}

/// Tag and attribute names are canonical lowercase ASCII.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+.-".contains(c))
}

fn default_allowed_tags() -> HashSet<String> {
    [
        "a",
        "abbr",
        "b",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "div",
        "dl",
        "dt",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "ins",
        "li",
        "ol",
        "p",
        "pre",
        "q",
        "small",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "tfoot",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_allowed_attributes() -> HashSet<String> {
    ["alt", "class", "height", "href", "id", "src", "title", "width"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_url_schemes() -> HashSet<String> {
    ["http", "https", "mailto", "ftp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_input_size() -> usize {
    100_000
}
