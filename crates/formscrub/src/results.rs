use std::collections::HashMap;
use std::time::Duration;

/// Outcome of scanning a single markup value.
#[derive(Debug, Clone)]
pub struct ScanResult {
    clean_html: String,
    error_messages: Vec<String>,
    scan_time: Duration,
}

impl ScanResult {
    pub fn new(clean_html: String, error_messages: Vec<String>, scan_time: Duration) -> Self {
        Self {
            clean_html,
            error_messages,
            scan_time,
        }
    }

    /// The cleaned markup. Zero errors means nothing structurally
    /// disallowed was removed, though attribute quoting and entity forms
    /// may still have been normalized.
    pub fn clean_html(&self) -> &str {
        &self.clean_html
    }

    pub fn into_clean_html(self) -> String {
        self.clean_html
    }

    pub fn number_of_errors(&self) -> usize {
        self.error_messages.len()
    }

    /// Human-readable descriptions of everything the scan removed, in
    /// source order.
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    pub fn scan_time(&self) -> Duration {
        self.scan_time
    }
}

/// Mutable accumulator the batch orchestrator fills while a batch scan is
/// in flight. Consumed by [`BatchAccumulator::finish`]; never reused across
/// batch invocations.
#[derive(Debug, Default)]
pub(crate) struct BatchAccumulator {
    fields: HashMap<String, Vec<String>>,
    error_messages: Vec<String>,
}

impl BatchAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a cleaned value to the field's sequence, creating the
    /// sequence on first use.
    pub(crate) fn add_clean_value(&mut self, field: &str, value: String) {
        self.fields.entry(field.to_owned()).or_default().push(value);
    }

    /// Drop a field whose every value scanned clean. No-op for fields
    /// never recorded.
    pub(crate) fn remove_field(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub(crate) fn add_error_messages<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.error_messages.extend(messages);
    }

    pub(crate) fn finish(mut self) -> BatchResults {
        // A retained field always holds at least one entry under correct
        // orchestration; fall back to a single empty placeholder rather
        // than exposing an empty sequence.
        for values in self.fields.values_mut() {
            if values.is_empty() {
                values.push(String::new());
            }
        }
        BatchResults {
            fields: self.fields,
            error_messages: self.error_messages,
        }
    }
}

/// Aggregated outcome of a batch scan.
///
/// Holds, for each field that required sanitization, the cleaned value
/// sequence in scan order, plus every error message the batch produced.
/// Fields whose every value scanned clean are absent. Constructed fresh
/// for each batch call and immutable once returned; all accessors are
/// side-effect-free and may be called any number of times.
#[derive(Debug, Clone, Default)]
pub struct BatchResults {
    fields: HashMap<String, Vec<String>>,
    error_messages: Vec<String>,
}

impl BatchResults {
    /// The finalized field → cleaned-values view, or `None` when no field
    /// required sanitization. The distinction lets callers tell "nothing
    /// needed cleaning" apart from "a field cleaned to empty values".
    pub fn clean_html_map(&self) -> Option<&HashMap<String, Vec<String>>> {
        if self.fields.is_empty() {
            None
        } else {
            Some(&self.fields)
        }
    }

    /// Cleaned values for one field, positionally matching the input
    /// values (empty inputs appear as `""`, unreliable cleanings as `" "`).
    pub fn field_values(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Every error message the batch produced, in scan order across all
    /// fields and values.
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    pub fn number_of_errors(&self) -> usize {
        self.error_messages.len()
    }

    /// True when nothing in the batch needed sanitization.
    pub fn is_clean(&self) -> bool {
        self.fields.is_empty() && self.error_messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_appends_in_order() {
        let mut acc = BatchAccumulator::new();
        acc.add_clean_value("body", "one".into());
        acc.add_clean_value("body", "two".into());
        let results = acc.finish();
        assert_eq!(
            results.field_values("body"),
            Some(&["one".to_owned(), "two".to_owned()][..])
        );
    }

    #[test]
    fn test_remove_field_is_noop_when_absent() {
        let mut acc = BatchAccumulator::new();
        acc.remove_field("missing");
        assert!(acc.finish().clean_html_map().is_none());
    }

    #[test]
    fn test_finish_defaults_empty_sequence_to_placeholder() {
        let mut acc = BatchAccumulator::new();
        acc.fields.insert("odd".into(), Vec::new());
        let results = acc.finish();
        assert_eq!(results.field_values("odd"), Some(&[String::new()][..]));
    }

    #[test]
    fn test_clean_map_absent_vs_empty_values() {
        let empty = BatchAccumulator::new().finish();
        assert!(empty.clean_html_map().is_none());

        let mut acc = BatchAccumulator::new();
        acc.add_clean_value("note", String::new());
        let results = acc.finish();
        let map = results.clean_html_map().expect("field should be present");
        assert_eq!(map["note"], vec![String::new()]);
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let mut acc = BatchAccumulator::new();
        acc.add_clean_value("a", "x".into());
        acc.add_error_messages(["bad".to_owned()]);
        let results = acc.finish();
        assert_eq!(results.clean_html_map(), results.clean_html_map());
        assert_eq!(results.error_messages(), results.error_messages());
        assert_eq!(results.number_of_errors(), 1);
    }
}
