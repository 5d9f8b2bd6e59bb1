use tracing::warn;

use crate::config::ItemMetadataConfig;
use crate::document::{Document, FIELD_ID};
use crate::error::ItemBuildError;
use crate::item::{Item, ItemStructuredData, ItemType};
use crate::schema::Schema;
use crate::structured_data::build_structured_data;

/// Maps a document onto a content item, following the metadata settings in `config`.
pub struct ItemBuilder<'a> {
    config: &'a ItemMetadataConfig,
    schema: Option<&'a Schema>,
}

impl<'a> ItemBuilder<'a> {
    pub fn new(config: &'a ItemMetadataConfig, schema: Option<&'a Schema>) -> Self {
        Self { config, schema }
    }

    pub fn build(&self, doc: &Document, content_type: &str) -> Result<Item, ItemBuildError> {
        let id = doc
            .id()
            .ok_or_else(|| ItemBuildError::MissingField(FIELD_ID.to_string()))?;

        let mut item = Item::new(id, ItemType::ContentItem);
        let metadata = &mut item.metadata;
        metadata.mime_type = Some(content_type.to_string());
        metadata.source_repository_url = doc.url().map(str::to_string);
        metadata.title = doc.first(&self.config.title_field).map(str::to_string);
        metadata.update_time = doc
            .first(&self.config.update_time_field)
            .map(str::to_string);
        metadata.create_time = self
            .config
            .create_time_field
            .as_deref()
            .and_then(|field| doc.first(field))
            .map(str::to_string);
        metadata.content_language = self.config.content_language.clone();
        metadata.object_type = self.config.object_type.clone();

        if let Some(object_type) = self.config.object_type.as_deref() {
            match self.schema.and_then(|s| s.object_definition(object_type)) {
                Some(object) => {
                    let object = build_structured_data(doc, object)?;
                    item.structured_data = Some(ItemStructuredData { object });
                }
                None => warn!(
                    object_type,
                    item = %item.name,
                    "Object type not found in schema, skipping structured data"
                ),
            }
        }

        Ok(item)
    }
}
