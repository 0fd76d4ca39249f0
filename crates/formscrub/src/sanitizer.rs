use crate::engine::{DomScanner, ScanEngine};
use crate::error::{PolicyError, ScanError};
use crate::fields::FieldSet;
use crate::policy::Policy;
use crate::results::{BatchAccumulator, BatchResults, ScanResult};

/// Placeholder stored when a value's cleaning cannot be trusted: either
/// the cleaned markup came out longer than the input, or the scan itself
/// failed.
const UNTRUSTED_PLACEHOLDER: &str = " ";

/// Entry point for single-value and batch sanitization.
///
/// The sanitizer holds no state of its own; every value scanned gets a
/// fresh engine so nothing leaks between values, fields, or concurrent
/// invocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer;

impl Sanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Scan one markup value against the policy.
    ///
    /// Scan-level failures propagate to the caller; a partially
    /// constructed result is never returned.
    pub fn scan(&self, markup: &str, policy: &Policy) -> Result<ScanResult, ScanError> {
        policy.validate()?;
        DomScanner::new().scan(markup, policy)
    }

    /// Scan one markup value with a caller-supplied engine.
    pub fn scan_with<E>(&self, markup: &str, policy: &Policy, engine: &E) -> Result<ScanResult, ScanError>
    where
        E: ScanEngine,
    {
        policy.validate()?;
        engine.scan(markup, policy)
    }

    /// Scan every value of every named field, folding the outcome into one
    /// [`BatchResults`].
    ///
    /// Only fields that actually required sanitization are surfaced:
    /// a field whose every value scans clean is dropped from the result.
    /// Retained fields keep 1:1 positional correspondence with their input
    /// values: null/empty inputs appear as `""`, and a value whose
    /// cleaning cannot be trusted appears as `" "`. A scan failure on one
    /// value is recorded as an error message for its field and never
    /// aborts the rest of the batch; the only fatal path is an invalid
    /// policy.
    pub fn scan_fields(
        &self,
        fields: &FieldSet,
        policy: &Policy,
    ) -> Result<BatchResults, PolicyError> {
        self.scan_fields_with(fields, policy, DomScanner::new)
    }

    /// Batch scan with a caller-supplied engine factory. The factory is
    /// invoked once per non-empty value, so engine state can never leak
    /// between values.
    pub fn scan_fields_with<E, F>(
        &self,
        fields: &FieldSet,
        policy: &Policy,
        make_engine: F,
    ) -> Result<BatchResults, PolicyError>
    where
        E: ScanEngine,
        F: Fn() -> E,
    {
        policy.validate()?;
        let mut results = BatchAccumulator::new();
        for (name, values) in fields.iter() {
            let Some(values) = values else {
                continue;
            };
            let mut field_has_error = false;
            for value in values {
                let value = value.as_deref().unwrap_or("");
                if value.is_empty() {
                    results.add_clean_value(name, String::new());
                    continue;
                }
                match make_engine().scan(value, policy) {
                    Ok(scanned) => {
                        if scanned.clean_html().len() > value.len() {
                            // Cleaning that grows its input is treated as
                            // unreliable, not as sanitized output.
                            log::warn!(
                                "cleaned markup for field {name:?} grew from {} to {} bytes, substituting a placeholder",
                                value.len(),
                                scanned.clean_html().len()
                            );
                            results.add_clean_value(name, UNTRUSTED_PLACEHOLDER.to_owned());
                        } else {
                            results.add_clean_value(name, scanned.clean_html().to_owned());
                        }
                        if scanned.number_of_errors() > 0 {
                            field_has_error = true;
                            results.add_error_messages(scanned.error_messages().iter().cloned());
                        }
                    }
                    Err(err) => {
                        log::warn!("scan of a value for field {name:?} failed: {err}");
                        field_has_error = true;
                        results.add_clean_value(name, UNTRUSTED_PLACEHOLDER.to_owned());
                        results.add_error_messages([format!(
                            "A value for field \"{name}\" could not be cleaned and was discarded: {err}"
                        )]);
                    }
                }
            }
            if !field_has_error {
                results.remove_field(name);
            }
        }
        Ok(results.finish())
    }
}
