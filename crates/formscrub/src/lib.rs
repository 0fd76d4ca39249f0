//! Allow-list HTML sanitization for untrusted form fields.
//!
//! `formscrub` scans user-supplied HTML/CSS against an allow-list
//! [`Policy`] and strips script-execution vectors (script tags, event
//! handlers, `javascript:`-style URLs, dynamic CSS) while keeping the
//! formatting the policy permits. Values are scanned one at a time with
//! [`Sanitizer::scan`], or as a named batch with
//! [`Sanitizer::scan_fields`], which reports only the fields that actually
//! required sanitization together with every error message in scan order.

pub mod engine;
pub mod error;
pub mod fields;
pub mod policy;
pub mod results;
pub mod sanitizer;
pub mod serialize;

pub use engine::{DomScanner, ScanEngine};
pub use error::{PolicyError, ScanError};
pub use fields::FieldSet;
pub use policy::Policy;
pub use results::{BatchResults, ScanResult};
pub use sanitizer::Sanitizer;
pub use serialize::{CompactSerializer, SerializeDocument};

#[cfg(test)]
mod tests;
