use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Instant;

use ammonia::Builder;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ScanError;
use crate::policy::Policy;
use crate::results::ScanResult;
use crate::serialize::{CompactSerializer, SerializeDocument};

lazy_static! {
    static ref OPEN_TAG: Regex =
        Regex::new(r#"(?i)<\s*([a-z][a-z0-9-]*)((?:[^>'"]|'[^']*'|"[^"]*")*)>"#)
            .expect("Invalid OPEN_TAG regex pattern");
    static ref ATTRIBUTE: Regex =
        Regex::new(r#"(?i)([a-z][a-z0-9:-]*)\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
            .expect("Invalid ATTRIBUTE regex pattern");
    static ref BARE_ATTRIBUTE: Regex = Regex::new(r"(?i)(?:^|\s)([a-z][a-z0-9:-]*)")
        .expect("Invalid BARE_ATTRIBUTE regex pattern");
    static ref URI_SCHEME: Regex = Regex::new(r"(?i)^\s*([a-z][a-z0-9+.-]*)\s*:")
        .expect("Invalid URI_SCHEME regex pattern");
    static ref CSS_EXPRESSION: Regex = Regex::new(r"(?i)expression\s*\(|behavior\s*:")
        .expect("Invalid CSS_EXPRESSION regex pattern");
}

/// Attributes whose values are dereferenced as URLs.
const URL_ATTRIBUTES: [&str; 7] = [
    "action",
    "background",
    "cite",
    "formaction",
    "href",
    "poster",
    "src",
];

/// Contract between the orchestration layer and the sanitization engine:
/// given one markup value and a policy, produce cleaned markup plus the
/// validation errors found along the way.
///
/// Implementations must be stateless per call: the orchestrator constructs
/// a fresh engine for every value it scans, so nothing may leak between
/// invocations. The policy is read-only for the duration of the call.
pub trait ScanEngine {
    fn scan(&self, markup: &str, policy: &Policy) -> Result<ScanResult, ScanError>;
}

/// Default scan engine, backed by ammonia's allow-list cleaner.
///
/// The pipeline per value: bound the input size, collect validation errors
/// from the raw markup, clean it against the policy's allow-lists, then
/// render the cleaned document through the injected serialization strategy.
#[derive(Debug, Clone, Default)]
pub struct DomScanner<S: SerializeDocument = CompactSerializer> {
    serializer: S,
}

impl DomScanner<CompactSerializer> {
    pub fn new() -> Self {
        Self {
            serializer: CompactSerializer,
        }
    }
}

impl<S: SerializeDocument> DomScanner<S> {
    /// Build a scanner with a custom serialization strategy.
    pub fn with_serializer(serializer: S) -> Self {
        Self { serializer }
    }
}

impl<S: SerializeDocument> ScanEngine for DomScanner<S> {
    fn scan(&self, markup: &str, policy: &Policy) -> Result<ScanResult, ScanError> {
        let started = Instant::now();
        if markup.len() > policy.max_input_size {
            return Err(ScanError::InputTooLarge {
                size: markup.len(),
                max: policy.max_input_size,
            });
        }

        let error_messages = collect_violations(markup, policy);

        let document = configure_builder(policy).clean(markup);
        let mut sink = Vec::with_capacity(markup.len());
        self.serializer.write_document(&document, &mut sink)?;
        let clean_html = String::from_utf8(sink)?;

        log::debug!(
            "scanned {} bytes in {:?}, {} violation(s)",
            markup.len(),
            started.elapsed(),
            error_messages.len()
        );
        Ok(ScanResult::new(clean_html, error_messages, started.elapsed()))
    }
}

fn configure_builder(policy: &Policy) -> Builder<'_> {
    let mut builder = Builder::new();
    builder
        .tags(policy.allowed_tags.iter().map(String::as_str).collect())
        .generic_attributes(policy.allowed_attributes.iter().map(String::as_str).collect())
        // Per-tag defaults would let attributes through that the policy
        // never listed; the generic allow-list is the single source.
        .tag_attributes(HashMap::new())
        .url_schemes(policy.url_schemes.iter().map(String::as_str).collect())
        .strip_comments(!policy.preserve_comments)
        .link_rel(if policy.nofollow_anchors {
            Some("nofollow noopener noreferrer")
        } else {
            Some("noopener noreferrer")
        })
        .attribute_filter(|_element, attribute, value| {
            if attribute == "style" && CSS_EXPRESSION.is_match(value) {
                None
            } else {
                Some(Cow::Borrowed(value))
            }
        });
    builder
}

/// Walk the raw markup and report everything the policy disallows.
///
/// One message per occurrence, in source order. The checks mirror what the
/// cleaner removes: tags outside the allow-list, attributes outside the
/// allow-list, event handlers, script-executing URL schemes, and dynamic
/// CSS in style attributes.
fn collect_violations(markup: &str, policy: &Policy) -> Vec<String> {
    let mut messages = Vec::new();
    for tag in OPEN_TAG.captures_iter(markup) {
        let name = tag[1].to_ascii_lowercase();
        if !policy.allowed_tags.contains(&name) {
            messages.push(format!(
                "The <{name}> tag is not allowed by the policy and has been removed"
            ));
            continue;
        }
        let body = tag.get(2).map_or("", |m| m.as_str());
        for attribute in ATTRIBUTE.captures_iter(body) {
            let attr_name = attribute[1].to_ascii_lowercase();
            let value = trim_attribute_value(attribute.get(2).map_or("", |m| m.as_str()));
            if attr_name.starts_with("on") && !policy.allowed_attributes.contains(&attr_name) {
                messages.push(format!(
                    "The {attr_name} event handler on <{name}> has been removed"
                ));
                continue;
            }
            if !policy.allowed_attributes.contains(&attr_name) {
                messages.push(format!(
                    "The {attr_name} attribute on <{name}> is not allowed by the policy and has been removed"
                ));
                continue;
            }
            if attr_name == "style" && CSS_EXPRESSION.is_match(value) {
                messages.push(format!(
                    "The style attribute on <{name}> contains dynamic CSS and has been removed"
                ));
                continue;
            }
            if URL_ATTRIBUTES.contains(&attr_name.as_str()) {
                if let Some(captures) = URI_SCHEME.captures(value) {
                    let scheme = captures[1].to_ascii_lowercase();
                    if !policy.url_schemes.contains(&scheme) {
                        messages.push(format!(
                            "The {scheme}: URL in the {attr_name} attribute on <{name}> has been removed"
                        ));
                    }
                }
            }
        }
        // Valueless attributes never match the name=value pass; find them
        // in what remains of the tag body once valued spans are blanked.
        for bare in BARE_ATTRIBUTE.captures_iter(&blank_valued_attributes(body)) {
            let attr_name = bare[1].to_ascii_lowercase();
            if policy.allowed_attributes.contains(&attr_name) {
                continue;
            }
            if attr_name.starts_with("on") {
                messages.push(format!(
                    "The {attr_name} event handler on <{name}> has been removed"
                ));
            } else {
                messages.push(format!(
                    "The {attr_name} attribute on <{name}> is not allowed by the policy and has been removed"
                ));
            }
        }
    }
    messages
}

/// Overwrite every name=value span with spaces, leaving only bare
/// attribute tokens behind. Length-preserving, so byte offsets stay valid.
fn blank_valued_attributes(body: &str) -> String {
    let mut bytes = body.as_bytes().to_vec();
    for span in ATTRIBUTE.find_iter(body) {
        for byte in &mut bytes[span.range()] {
            *byte = b' ';
        }
    }
    String::from_utf8(bytes).expect("blanking attribute spans preserves UTF-8")
}

fn trim_attribute_value(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(raw)
}
