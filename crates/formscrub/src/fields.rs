/// Ordered batch input: named fields, each carrying an optional sequence
/// of optional values, mirroring a multi-value form submission.
///
/// `None` at the sequence level models a field that arrived with no value
/// array at all; such fields are skipped entirely. `None` (or `""`) at
/// the element level models a single missing value, which is recorded as
/// an empty placeholder without scanning. Fields are scanned in insertion
/// order; field names are expected to be unique.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    entries: Vec<(String, Option<Vec<Option<String>>>)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field with its raw value sequence.
    pub fn insert<N: Into<String>>(&mut self, name: N, values: Option<Vec<Option<String>>>) {
        self.entries.push((name.into(), values));
    }

    /// Convenience for the common case of a present, non-null value list.
    pub fn insert_values<N, V, I>(&mut self, name: N, values: I)
    where
        N: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        let values = values.into_iter().map(|v| Some(v.into())).collect();
        self.insert(name, Some(values));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[Option<String>]>)> + '_ {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_deref()))
    }
}

impl<N: Into<String>> FromIterator<(N, Option<Vec<Option<String>>>)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (N, Option<Vec<Option<String>>>)>>(iter: I) -> Self {
        let mut fields = FieldSet::new();
        for (name, values) in iter {
            fields.insert(name, values);
        }
        fields
    }
}
