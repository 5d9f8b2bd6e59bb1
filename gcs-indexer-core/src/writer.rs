//! The index writer: lifecycle of the backend client and the per-document submission pipeline.
//!
//! # Lifecycle
//! `open` → any number of `write` / `update` / `delete` → `close`. A closed writer
//! stays closed.
//!
//! # Error containment
//! A document that cannot produce a content payload is rejected back to the
//! caller. Once the payload exists, anything that goes wrong while building the
//! item or talking to the backend is logged and counted, and the call returns
//! `Ok(())` so the surrounding batch keeps going.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::acl::resolve_acl;
use crate::config::{ConfigState, Configuration};
use crate::content::{select_content, UploadFormat};
use crate::contract::{DefaultAcl, Helper, IndexWriter, IndexWriterParams, IndexingService};
use crate::document::Document;
use crate::error::{IndexWriterError, ItemBuildError, Result, ServiceError};
use crate::item::{ContentPayload, RequestMode};
use crate::item_builder::ItemBuilder;
use crate::schema::Schema;
use crate::structured_data::StructuredData;

pub const CONFIG_KEY_CONFIG_FILE: &str = "gcs.config.file";
pub const CONFIG_KEY_UPLOAD_FORMAT: &str = "gcs.uploadFormat";
pub const DESCRIPTION: &str = "Google Cloud Search Indexer";

/// Running totals for one writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Documents accepted by the backend.
    pub indexed: u64,
    /// Documents dropped after their payload was built (logged, not returned).
    pub failed: u64,
    pub deleted: u64,
}

#[derive(Error, Debug)]
enum SubmitError {
    #[error(transparent)]
    Build(#[from] ItemBuildError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

struct OpenState {
    config: Arc<Configuration>,
    upload_format: UploadFormat,
    service: Box<dyn IndexingService>,
    default_acl: Box<dyn DefaultAcl>,
    schema: Arc<Schema>,
}

impl OpenState {
    async fn submit(
        &self,
        doc: &Document,
        content_type: &str,
        payload: ContentPayload,
    ) -> std::result::Result<(), SubmitError> {
        let builder = ItemBuilder::new(&self.config.item_metadata, Some(&self.schema));
        let mut item = builder.build(doc, content_type)?;
        resolve_acl(self.default_acl.as_ref(), &mut item);

        self.service
            .index_item_and_content(
                item,
                payload,
                None, // no content hash: push queues are not used
                self.upload_format.content_format(),
                RequestMode::Asynchronous,
            )
            .await?;
        Ok(())
    }
}

/// [`IndexWriter`] that pushes documents to the hosted search backend.
pub struct CloudSearchIndexWriter {
    helper: Box<dyn Helper>,
    config_state: Arc<ConfigState>,
    structured_data: Arc<StructuredData>,
    state: Option<OpenState>,
    closed: bool,
    stats: WriterStats,
}

impl CloudSearchIndexWriter {
    /// Writer with its own configuration guard and the process-wide schema cache.
    pub fn new(helper: impl Helper + 'static) -> Self {
        Self::with_shared_state(
            Box::new(helper),
            Arc::new(ConfigState::new()),
            StructuredData::shared(),
        )
    }

    /// Writer that shares the given configuration guard and schema cache.
    pub fn with_shared_state(
        helper: Box<dyn Helper>,
        config_state: Arc<ConfigState>,
        structured_data: Arc<StructuredData>,
    ) -> Self {
        Self {
            helper,
            config_state,
            structured_data,
            state: None,
            closed: false,
            stats: WriterStats::default(),
        }
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Upload format selected at `open`, if open.
    pub fn upload_format(&self) -> Option<UploadFormat> {
        self.state.as_ref().map(|s| s.upload_format)
    }

    fn init_config(&self, params: &IndexWriterParams) -> Result<Arc<Configuration>> {
        let path = params
            .get(CONFIG_KEY_CONFIG_FILE)
            .ok_or(IndexWriterError::MissingConfigPath)?;

        if let Some(config) = self.config_state.get() {
            debug!(config_path = %path, "[OPEN] Configuration already initialized");
            return Ok(config);
        }

        let loaded = self.helper.load_config(Path::new(path)).map_err(|e| {
            error!(error = %e, config_path = %path, "[OPEN] Failed to load configuration");
            IndexWriterError::ConfigInit(e)
        })?;
        let config = self.config_state.initialize(loaded);
        config.trace_loaded();
        Ok(config)
    }

    async fn finish_open(
        &self,
        config: &Configuration,
        service: &dyn IndexingService,
    ) -> Result<(Box<dyn DefaultAcl>, Arc<Schema>)> {
        let default_acl = self
            .helper
            .init_default_acl(config)
            .map_err(IndexWriterError::ConfigInit)?;
        let schema = self
            .structured_data
            .init_from_service(service)
            .await
            .map_err(IndexWriterError::Schema)?;
        Ok((default_acl, schema))
    }

    fn state(&self) -> Result<&OpenState> {
        match &self.state {
            Some(state) => Ok(state),
            None if self.closed => Err(IndexWriterError::Closed),
            None => Err(IndexWriterError::NotOpen),
        }
    }
}

fn upload_format_from(params: &IndexWriterParams) -> Result<UploadFormat> {
    match params.get(CONFIG_KEY_UPLOAD_FORMAT) {
        Some(value) => value.parse(),
        None => Ok(UploadFormat::default()),
    }
}

#[async_trait]
impl IndexWriter for CloudSearchIndexWriter {
    async fn open(&mut self, params: &IndexWriterParams) -> Result<()> {
        if self.closed {
            return Err(IndexWriterError::Closed);
        }
        if self.state.is_some() {
            warn!("[OPEN] Writer is already open, ignoring");
            return Ok(());
        }
        info!("[OPEN] Starting up!");

        let config = self.init_config(params)?;
        let upload_format = upload_format_from(params)?;

        let service = self.helper.create_indexing_service(&config).map_err(|e| {
            error!(error = %e, "[OPEN] Failed to create indexing service");
            IndexWriterError::ClientCreation(e)
        })?;
        service.start().await.map_err(|e| {
            error!(error = %e, "[OPEN] Indexing service failed to start");
            IndexWriterError::ClientStart(e)
        })?;

        // The client is running from here on; a failed open must not leave it behind.
        let (default_acl, schema) = match self.finish_open(&config, service.as_ref()).await {
            Ok(parts) => parts,
            Err(e) => {
                error!(error = %e, "[OPEN] Open failed after service start, stopping service");
                if let Err(stop_err) = service.stop().await {
                    error!(error = %stop_err, "[OPEN] Indexing service failed to stop cleanly");
                }
                return Err(e);
            }
        };

        info!(%upload_format, "[OPEN] Indexing service running");
        self.state = Some(OpenState {
            config,
            upload_format,
            service,
            default_acl,
            schema,
        });
        Ok(())
    }

    async fn write(&mut self, doc: &Document) -> Result<()> {
        let started = Instant::now();
        let state = match &self.state {
            Some(state) => state,
            None => return self.state().map(|_| ()),
        };

        let content_type = doc
            .content_type()
            .ok_or(IndexWriterError::ContentTypeMissing)?;
        let payload = select_content(doc, state.upload_format)?;
        let size = payload.display_size();
        let url = doc.url().unwrap_or_default();

        match state.submit(doc, content_type, payload).await {
            Ok(()) => {
                self.stats.indexed += 1;
                info!(
                    content_type,
                    size = %size,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    url,
                    "[WRITE] Document indexed"
                );
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(error = %e, url, "[WRITE] Exception caught while indexing");
            }
        }
        Ok(())
    }

    async fn update(&mut self, doc: &Document) -> Result<()> {
        self.write(doc).await
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(IndexWriterError::Validation(
                "item id to delete must not be empty".to_string(),
            ));
        }
        let state = self.state()?;
        let version = self.helper.current_time_millis().to_string().into_bytes();
        state
            .service
            .delete_item(key, version, RequestMode::Asynchronous)
            .await
            .map_err(|source| {
                error!(error = %source, id = key, "[DELETE] Delete failed");
                IndexWriterError::Delete {
                    id: key.to_string(),
                    source,
                }
            })?;
        self.stats.deleted += 1;
        debug!(id = key, "[DELETE] Delete submitted");
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) {
        let started = Instant::now();
        if let Some(state) = self.state.take() {
            if state.service.is_running() {
                if let Err(e) = state.service.stop().await {
                    error!(error = %e, "[CLOSE] Indexing service failed to stop cleanly");
                }
            }
            self.closed = true;
        }
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            indexed = self.stats.indexed,
            failed = self.stats.failed,
            deleted = self.stats.deleted,
            "[CLOSE] Shutting down"
        );
    }

    fn describe(&self) -> String {
        DESCRIPTION.to_string()
    }
}
