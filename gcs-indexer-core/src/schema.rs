//! Backend schema: object definitions and their typed property definitions.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default)]
    pub object_definitions: Vec<ObjectDefinition>,
}

impl Schema {
    pub fn object_definition(&self, name: &str) -> Option<&ObjectDefinition> {
        self.object_definitions.iter().find(|o| o.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDefinition {
    pub name: String,
    #[serde(default)]
    pub property_definitions: Vec<PropertyDefinition>,
}

impl ObjectDefinition {
    pub fn new(name: impl Into<String>, property_definitions: Vec<PropertyDefinition>) -> Self {
        Self {
            name: name.into(),
            property_definitions,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.property_definitions.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Text,
    Html,
    Integer,
    Double,
    Boolean,
    Timestamp,
    Date,
    Enum,
    /// Nested objects and anything newer than this client.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PropertyDefinitionWire")]
pub struct PropertyDefinition {
    pub name: String,
    pub is_repeatable: bool,
    pub property_type: PropertyType,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, property_type: PropertyType, is_repeatable: bool) -> Self {
        Self {
            name: name.into(),
            is_repeatable,
            property_type,
        }
    }
}

// The backend encodes the property type as whichever `*PropertyOptions` key is present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyDefinitionWire {
    name: String,
    #[serde(default)]
    is_repeatable: bool,
    text_property_options: Option<serde_json::Value>,
    html_property_options: Option<serde_json::Value>,
    integer_property_options: Option<serde_json::Value>,
    double_property_options: Option<serde_json::Value>,
    boolean_property_options: Option<serde_json::Value>,
    timestamp_property_options: Option<serde_json::Value>,
    date_property_options: Option<serde_json::Value>,
    enum_property_options: Option<serde_json::Value>,
}

impl From<PropertyDefinitionWire> for PropertyDefinition {
    fn from(w: PropertyDefinitionWire) -> Self {
        let property_type = if w.text_property_options.is_some() {
            PropertyType::Text
        } else if w.html_property_options.is_some() {
            PropertyType::Html
        } else if w.integer_property_options.is_some() {
            PropertyType::Integer
        } else if w.double_property_options.is_some() {
            PropertyType::Double
        } else if w.boolean_property_options.is_some() {
            PropertyType::Boolean
        } else if w.timestamp_property_options.is_some() {
            PropertyType::Timestamp
        } else if w.date_property_options.is_some() {
            PropertyType::Date
        } else if w.enum_property_options.is_some() {
            PropertyType::Enum
        } else {
            PropertyType::Unsupported
        };
        PropertyDefinition {
            name: w.name,
            is_repeatable: w.is_repeatable,
            property_type,
        }
    }
}
