/// Value of a single JSON field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Ordinary text, escaped according to the serializer's mode.
    Str(String),
    /// Text that is already safe inside a JSON string literal.
    Escaped(String),
    Int(i64),
    Null,
    Object(FieldSet),
}

/// Insertion-ordered set of JSON fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    entries: Vec<(&'static str, FieldValue)>,
}

impl FieldSet {
    pub fn with_capacity(capacity: usize) -> Self {
        FieldSet { entries: Vec::with_capacity(capacity) }
    }

    /// Append a field. Keys are expected to be unique and JSON-safe.
    pub fn insert(&mut self, key: &'static str, value: FieldValue) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        s.map_or(FieldValue::Null, FieldValue::Str)
    }
}

impl From<FieldSet> for FieldValue {
    fn from(set: FieldSet) -> Self {
        FieldValue::Object(set)
    }
}
