//! Backend-facing item model, serialized in the backend's camelCase JSON.

use serde::{Deserialize, Serialize};

/// Kind of item submitted to the index. This writer only ever emits content items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    ContentItem,
}

/// One indexed document as the backend sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub item_type: ItemType,
    pub metadata: ItemMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<ItemStructuredData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<ItemAcl>,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
            metadata: ItemMetadata::default(),
            structured_data: None,
            acl: None,
        }
    }

    /// Whether the item carries at least one reader, denied reader or owner.
    pub fn has_acl(&self) -> bool {
        self.acl.as_ref().is_some_and(|acl| !acl.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAcl {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub readers: Vec<Principal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub denied_readers: Vec<Principal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<Principal>,
}

impl ItemAcl {
    pub fn with_readers(readers: Vec<Principal>) -> Self {
        Self {
            readers,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty() && self.denied_readers.is_empty() && self.owners.is_empty()
    }
}

/// Someone who may be granted or denied access to an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "PrincipalWire")]
pub enum Principal {
    /// Everyone in the customer's domain.
    Customer,
    User(String),
    Group(String),
}

impl Principal {
    /// The synthetic principal standing for the whole organization.
    pub fn customer() -> Self {
        Principal::Customer
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrincipalWire {
    gsuite_principal: GSuitePrincipalWire,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GSuitePrincipalWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    gsuite_domain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gsuite_user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gsuite_group_email: Option<String>,
}

impl From<Principal> for PrincipalWire {
    fn from(p: Principal) -> Self {
        let gsuite_principal = match p {
            Principal::Customer => GSuitePrincipalWire {
                gsuite_domain: Some(true),
                ..Default::default()
            },
            Principal::User(email) => GSuitePrincipalWire {
                gsuite_user_email: Some(email),
                ..Default::default()
            },
            Principal::Group(email) => GSuitePrincipalWire {
                gsuite_group_email: Some(email),
                ..Default::default()
            },
        };
        PrincipalWire { gsuite_principal }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStructuredData {
    pub object: StructuredDataObject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredDataObject {
    pub properties: Vec<NamedProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedProperty {
    pub name: String,
    #[serde(flatten)]
    pub value: PropertyValue,
}

/// Values of one named property, already coerced to the schema type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValue {
    BooleanValue(bool),
    TextValues(Values<String>),
    HtmlValues(Values<String>),
    IntegerValues(Values<i64>),
    DoubleValues(Values<f64>),
    TimestampValues(Values<String>),
    DateValues(Values<Date>),
    EnumValues(Values<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Values<T> {
    pub values: Vec<T>,
}

impl<T> From<Vec<T>> for Values<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Wire format declared for a content payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentFormat {
    Raw,
    Text,
}

/// Whether the backend processes a request inline or queues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestMode {
    Synchronous,
    Asynchronous,
}

impl RequestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Synchronous => "SYNCHRONOUS",
            RequestMode::Asynchronous => "ASYNCHRONOUS",
        }
    }
}

/// Bytes submitted as an item's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ContentPayload {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Human readable size, e.g. `14 bytes`, `3 KB`, `12 MB`.
    pub fn display_size(&self) -> String {
        const KB: usize = 1024;
        const MB: usize = KB * 1024;
        const GB: usize = MB * 1024;
        match self.len() {
            n if n >= GB => format!("{} GB", n / GB),
            n if n >= MB => format!("{} MB", n / MB),
            n if n >= KB => format!("{} KB", n / KB),
            n => format!("{n} bytes"),
        }
    }
}

/// The backend's acknowledgement of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
}
