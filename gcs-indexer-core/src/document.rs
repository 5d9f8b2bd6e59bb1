//! The crawler's per-document record: field names mapped to one or more string values.

use serde::{Deserialize, Deserializer};

/// Field carrying the document identifier.
pub const FIELD_ID: &str = "id";
/// Field carrying the document's source URL.
pub const FIELD_URL: &str = "url";
/// Field carrying base64-encoded raw content.
pub const FIELD_RAW_CONTENT: &str = "binaryContent";
/// Field carrying extracted text content.
pub const FIELD_TEXT_CONTENT: &str = "content";
/// Field carrying the declared MIME type.
pub const FIELD_CONTENT_TYPE: &str = "type";

/// A single named field and all of its values, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentField {
    pub name: String,
    pub values: Vec<String>,
}

/// An insertion-ordered mapping from field name to values.
///
/// Adding a value to an existing field appends to it rather than replacing it,
/// so multi-valued fields keep every value the crawler produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<DocumentField>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the field `name`, creating the field if needed.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.values.push(value),
            None => self.fields.push(DocumentField {
                name,
                values: vec![value],
            }),
        }
        self
    }

    /// Builder-style variant of [`Document::add`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&DocumentField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// First value of the field, if any.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(|f| f.values.first())
            .map(String::as_str)
    }

    /// First value of the field, treating an empty string as absent.
    pub fn first_non_empty(&self, name: &str) -> Option<&str> {
        self.first(name).filter(|v| !v.is_empty())
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.field(name).map(|f| f.values.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn id(&self) -> Option<&str> {
        self.first_non_empty(FIELD_ID)
    }

    pub fn url(&self) -> Option<&str> {
        self.first(FIELD_URL)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.first_non_empty(FIELD_CONTENT_TYPE)
    }
}

/// Accepts a JSON object whose values are scalars or arrays of scalars.
/// Scalars are stringified; `null` values and nested objects are dropped.
impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut doc = Document::new();
        for (name, value) in raw {
            match value {
                serde_json::Value::Array(items) => {
                    for item in items {
                        if let Some(v) = scalar_to_string(item) {
                            doc.add(name.clone(), v);
                        }
                    }
                }
                other => {
                    if let Some(v) = scalar_to_string(other) {
                        doc.add(name, v);
                    }
                }
            }
        }
        Ok(doc)
    }
}

fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
