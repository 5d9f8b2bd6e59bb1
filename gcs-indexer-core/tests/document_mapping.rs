//! Document parsing, content selection and document → item mapping.

use gcs_indexer_core::config::ItemMetadataConfig;
use gcs_indexer_core::content::{select_content, UploadFormat};
use gcs_indexer_core::document::{
    Document, FIELD_CONTENT_TYPE, FIELD_ID, FIELD_RAW_CONTENT, FIELD_TEXT_CONTENT, FIELD_URL,
};
use gcs_indexer_core::error::{IndexWriterError, ItemBuildError};
use gcs_indexer_core::item::{ContentFormat, ItemType, PropertyValue};
use gcs_indexer_core::item_builder::ItemBuilder;
use gcs_indexer_core::schema::{ObjectDefinition, PropertyDefinition, PropertyType, Schema};

#[test]
fn document_from_json_flattens_arrays_and_stringifies_scalars() {
    let doc: Document = serde_json::from_str(
        r#"{"id": "XYZ123", "tags": ["a", "b", null], "pages": 12, "approved": true, "nested": {"x": 1}, "skip": null}"#,
    )
    .unwrap();

    assert_eq!(doc.id(), Some("XYZ123"));
    assert_eq!(doc.values("tags"), ["a".to_string(), "b".to_string()]);
    assert_eq!(doc.first("pages"), Some("12"));
    assert_eq!(doc.first("approved"), Some("true"));
    assert!(doc.field("nested").is_none());
    assert!(doc.field("skip").is_none());
}

#[test]
fn document_rejects_non_object_json() {
    assert!(serde_json::from_str::<Document>("[1, 2]").is_err());
}

#[test]
fn repeated_adds_append_values_in_order() {
    let mut doc = Document::new();
    doc.add("tags", "b").add("tags", "a").add(FIELD_ID, "1");

    assert_eq!(doc.len(), 2);
    assert_eq!(doc.values("tags"), ["b".to_string(), "a".to_string()]);
    assert_eq!(doc.first("tags"), Some("b"));
}

#[test]
fn empty_identity_values_count_as_missing() {
    let doc = Document::new().with(FIELD_ID, "").with(FIELD_CONTENT_TYPE, "");
    assert_eq!(doc.id(), None);
    assert_eq!(doc.content_type(), None);
}

#[test]
fn upload_format_parsing() {
    assert_eq!("raw".parse::<UploadFormat>().unwrap(), UploadFormat::Raw);
    assert_eq!("Text".parse::<UploadFormat>().unwrap(), UploadFormat::Text);
    assert_eq!(UploadFormat::default(), UploadFormat::Raw);
    assert_eq!(UploadFormat::Text.content_format(), ContentFormat::Text);
    assert_eq!(UploadFormat::Text.to_string(), "TEXT");

    let err = "html".parse::<UploadFormat>().unwrap_err();
    assert_eq!(err.to_string(), "Unknown value for 'gcs.uploadFormat': html");
}

#[test]
fn raw_content_is_base64_decoded() {
    let doc = Document::new()
        .with(FIELD_CONTENT_TYPE, "text/pdf")
        .with(FIELD_RAW_CONTENT, "VGVzdDEyMzQ1Njc4OTA=");

    let payload = select_content(&doc, UploadFormat::Raw).unwrap();

    assert_eq!(payload.mime_type, "text/pdf");
    assert_eq!(payload.bytes, b"Test1234567890");
    assert_eq!(payload.display_size(), "14 bytes");
}

#[test]
fn raw_content_uses_first_value_only() {
    let doc = Document::new()
        .with(FIELD_CONTENT_TYPE, "text/pdf")
        .with(FIELD_RAW_CONTENT, "YQ==")
        .with(FIELD_RAW_CONTENT, "not base64!");

    let payload = select_content(&doc, UploadFormat::Raw).unwrap();
    assert_eq!(payload.bytes, b"a");
}

#[test]
fn text_format_ignores_binary_content() {
    let doc = Document::new()
        .with(FIELD_CONTENT_TYPE, "text/plain")
        .with(FIELD_RAW_CONTENT, "Content_not_in+Base64")
        .with(FIELD_TEXT_CONTENT, "hello");

    let payload = select_content(&doc, UploadFormat::Text).unwrap();
    assert_eq!(payload.bytes, b"hello");
}

#[test]
fn content_type_is_checked_before_content() {
    let doc = Document::new();
    for format in [UploadFormat::Raw, UploadFormat::Text] {
        assert!(matches!(
            select_content(&doc, format),
            Err(IndexWriterError::ContentTypeMissing)
        ));
    }
}

#[test]
fn item_builder_requires_an_id() {
    let config = ItemMetadataConfig::default();
    let doc = Document::new().with(FIELD_URL, "http://x.yz/abc");

    let err = ItemBuilder::new(&config, None)
        .build(&doc, "text/plain")
        .unwrap_err();
    assert_eq!(err, ItemBuildError::MissingField(FIELD_ID.to_string()));
}

#[test]
fn item_builder_uses_default_metadata_fields() {
    let config = ItemMetadataConfig::default();
    let doc = Document::new()
        .with(FIELD_ID, "XYZ123")
        .with(FIELD_URL, "http://x.yz/abc")
        .with("title", "Hello")
        .with("lastModified", "2018-08-18T18:01:23.100Z");

    let item = ItemBuilder::new(&config, None).build(&doc, "text/html").unwrap();

    assert_eq!(item.name, "XYZ123");
    assert_eq!(item.item_type, ItemType::ContentItem);
    assert_eq!(item.metadata.title.as_deref(), Some("Hello"));
    assert_eq!(item.metadata.mime_type.as_deref(), Some("text/html"));
    assert_eq!(
        item.metadata.source_repository_url.as_deref(),
        Some("http://x.yz/abc")
    );
    assert_eq!(
        item.metadata.update_time.as_deref(),
        Some("2018-08-18T18:01:23.100Z")
    );
    assert_eq!(item.metadata.create_time, None);
    assert!(item.acl.is_none());
    assert!(item.structured_data.is_none());
}

#[test]
fn item_builder_skips_structured_data_for_unknown_object_type() {
    let config = ItemMetadataConfig {
        object_type: Some("missing".to_string()),
        ..ItemMetadataConfig::default()
    };
    let schema = Schema {
        object_definitions: vec![ObjectDefinition::new(
            "schema1",
            vec![PropertyDefinition::new("approved", PropertyType::Boolean, false)],
        )],
    };
    let doc = Document::new().with(FIELD_ID, "1").with("approved", "true");

    let item = ItemBuilder::new(&config, Some(&schema))
        .build(&doc, "text/plain")
        .unwrap();

    assert!(item.structured_data.is_none());
    assert_eq!(item.metadata.object_type.as_deref(), Some("missing"));
}

#[test]
fn item_builder_propagates_coercion_errors() {
    let config = ItemMetadataConfig {
        object_type: Some("schema1".to_string()),
        ..ItemMetadataConfig::default()
    };
    let schema = Schema {
        object_definitions: vec![ObjectDefinition::new(
            "schema1",
            vec![
                PropertyDefinition::new("approved", PropertyType::Boolean, false),
                PropertyDefinition::new("pages", PropertyType::Integer, false),
            ],
        )],
    };
    let builder = ItemBuilder::new(&config, Some(&schema));

    let good = Document::new().with(FIELD_ID, "1").with("pages", "7");
    let item = builder.build(&good, "text/plain").unwrap();
    let props = item.structured_data.unwrap().object.properties;
    assert_eq!(props[0].value, PropertyValue::IntegerValues(vec![7].into()));

    let bad = Document::new().with(FIELD_ID, "1").with("approved", "maybe");
    assert!(matches!(
        builder.build(&bad, "text/plain"),
        Err(ItemBuildError::Coercion { .. })
    ));
}

#[test]
fn item_serializes_to_backend_json() {
    let config = ItemMetadataConfig::default();
    let doc = Document::new().with(FIELD_ID, "XYZ123").with("title", "Hi");
    let item = ItemBuilder::new(&config, None).build(&doc, "text/plain").unwrap();

    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "name": "XYZ123",
            "itemType": "CONTENT_ITEM",
            "metadata": {"title": "Hi", "mimeType": "text/plain"}
        })
    );
}

#[test]
fn schema_deserializes_property_types_from_options() {
    let schema: Schema = serde_json::from_str(
        r#"{
            "objectDefinitions": [{
                "name": "schema1",
                "propertyDefinitions": [
                    {"name": "approved", "booleanPropertyOptions": {}},
                    {"name": "tags", "isRepeatable": true, "textPropertyOptions": {}},
                    {"name": "blob", "objectPropertyOptions": {}}
                ]
            }]
        }"#,
    )
    .unwrap();

    let object = schema.object_definition("schema1").unwrap();
    assert_eq!(
        object.property("approved").unwrap().property_type,
        PropertyType::Boolean
    );
    let tags = object.property("tags").unwrap();
    assert_eq!(tags.property_type, PropertyType::Text);
    assert!(tags.is_repeatable);
    assert_eq!(
        object.property("blob").unwrap().property_type,
        PropertyType::Unsupported
    );
}
