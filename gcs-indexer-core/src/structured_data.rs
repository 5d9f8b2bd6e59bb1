//! Schema-backed structured data.
//!
//! [`StructuredData`] caches the backend schema. One instance is usually shared by
//! every writer in the process, so the schema is fetched once no matter how many
//! writers are opened. [`build_structured_data`] maps document fields onto the
//! properties of one object definition.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::contract::IndexingService;
use crate::document::Document;
use crate::error::{ItemBuildError, ServiceError};
use crate::item::{Date, NamedProperty, PropertyValue, StructuredDataObject};
use crate::schema::{ObjectDefinition, PropertyDefinition, PropertyType, Schema};

static SHARED: OnceLock<Arc<StructuredData>> = OnceLock::new();

/// Lazily initialized schema cache.
#[derive(Debug, Default)]
pub struct StructuredData {
    schema: Mutex<Option<Arc<Schema>>>,
}

impl StructuredData {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-wide instance used by writers that are not given their own.
    pub fn shared() -> Arc<Self> {
        SHARED.get_or_init(StructuredData::new).clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.schema.lock().await.is_some()
    }

    pub async fn schema(&self) -> Option<Arc<Schema>> {
        self.schema.lock().await.clone()
    }

    /// Fetch the schema from `service` unless it is already cached.
    ///
    /// The check and the fetch happen under one lock, so concurrent callers
    /// trigger a single `get_schema` call between them.
    pub async fn init_from_service(
        &self,
        service: &dyn IndexingService,
    ) -> Result<Arc<Schema>, ServiceError> {
        let mut guard = self.schema.lock().await;
        if let Some(schema) = guard.as_ref() {
            debug!("Structured data already initialized, reusing cached schema");
            return Ok(schema.clone());
        }
        let schema = Arc::new(service.get_schema().await?);
        info!(
            object_definitions = schema.object_definitions.len(),
            "Structured data initialized from schema"
        );
        *guard = Some(schema.clone());
        Ok(schema)
    }

    /// Drop the cached schema. The next `init_from_service` fetches it again.
    pub async fn reset(&self) {
        *self.schema.lock().await = None;
    }
}

/// Build the structured data object for `doc` against `object`.
///
/// Fields without a matching property are ignored. Values are coerced to the
/// property's declared type; non-repeatable properties keep only the first value.
pub fn build_structured_data(
    doc: &Document,
    object: &ObjectDefinition,
) -> Result<StructuredDataObject, ItemBuildError> {
    let mut properties = Vec::new();
    for field in doc.iter() {
        let Some(definition) = object.property(&field.name) else {
            continue;
        };
        if field.values.is_empty() {
            continue;
        }
        let values: &[String] = if definition.is_repeatable {
            &field.values
        } else {
            &field.values[..1]
        };
        if let Some(value) = coerce(definition, values)? {
            properties.push(NamedProperty {
                name: definition.name.clone(),
                value,
            });
        }
    }
    Ok(StructuredDataObject { properties })
}

fn coerce(
    definition: &PropertyDefinition,
    values: &[String],
) -> Result<Option<PropertyValue>, ItemBuildError> {
    let strings = || values.to_vec();
    let value = match definition.property_type {
        PropertyType::Text => PropertyValue::TextValues(strings().into()),
        PropertyType::Html => PropertyValue::HtmlValues(strings().into()),
        PropertyType::Enum => PropertyValue::EnumValues(strings().into()),
        // Booleans are single-valued on the wire, even when marked repeatable.
        PropertyType::Boolean => {
            if values.len() > 1 {
                debug!(
                    property = %definition.name,
                    dropped = values.len() - 1,
                    "Boolean property keeps only its first value"
                );
            }
            PropertyValue::BooleanValue(parse_bool(definition, &values[0])?)
        }
        PropertyType::Integer => PropertyValue::IntegerValues(
            parse_each(definition, values, "integer", |v| v.trim().parse::<i64>().ok())?.into(),
        ),
        PropertyType::Double => PropertyValue::DoubleValues(
            parse_each(definition, values, "double", |v| v.trim().parse::<f64>().ok())?.into(),
        ),
        PropertyType::Timestamp => PropertyValue::TimestampValues(
            parse_each(definition, values, "timestamp", parse_timestamp)?.into(),
        ),
        PropertyType::Date => {
            PropertyValue::DateValues(parse_each(definition, values, "date", parse_date)?.into())
        }
        PropertyType::Unsupported => {
            debug!(property = %definition.name, "Skipping property of unsupported type");
            return Ok(None);
        }
    };
    Ok(Some(value))
}

fn parse_bool(definition: &PropertyDefinition, value: &str) -> Result<bool, ItemBuildError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(coercion_error(definition, value, "boolean")),
    }
}

fn parse_each<T>(
    definition: &PropertyDefinition,
    values: &[String],
    expected: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, ItemBuildError> {
    values
        .iter()
        .map(|v| parse(v).ok_or_else(|| coercion_error(definition, v, expected)))
        .collect()
}

fn parse_timestamp(value: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn parse_date(value: &str) -> Option<Date> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|t| t.with_timezone(&Utc).date_naive())
        })?;
    Some(Date {
        year: date.year(),
        month: date.month(),
        day: date.day(),
    })
}

fn coercion_error(
    definition: &PropertyDefinition,
    value: &str,
    expected: &'static str,
) -> ItemBuildError {
    ItemBuildError::Coercion {
        property: definition.name.clone(),
        value: value.to_string(),
        expected,
    }
}

