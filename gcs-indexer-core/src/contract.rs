#![allow(unused)]

//! # contract: interfaces between the index writer and the outside world
//!
//! The writer never talks to the backend, the configuration file or the clock
//! directly. It reaches them through the traits below, which are injected at
//! construction time:
//!
//! - [`IndexingService`]: the backend indexing client (schema, index, delete, lifecycle).
//! - [`DefaultAcl`]: the configured default access policy.
//! - [`Helper`]: factory for the two above, plus configuration loading and time.
//! - [`IndexWriter`]: the surface a crawl batch driver consumes.
//!
//! ## Mocking & Testing
//! - All traits are annotated for `mockall`; the generated `Mock*` types are
//!   exported under the `test-export-mocks` feature so downstream crates can use them.

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use std::collections::HashMap;
use std::path::Path;

use crate::config::Configuration;
use crate::document::Document;
use crate::error::{ClientCreationError, ConfigError, IndexWriterError, ServiceError};
use crate::item::{ContentFormat, ContentPayload, Item, Operation, RequestMode};
use crate::schema::Schema;

/// Backend indexing client.
///
/// `start` and `stop` resolve only once the client is running or terminated,
/// so callers can treat them as blocking lifecycle transitions.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IndexingService: Send + Sync {
    /// Fetch the schema currently registered for the data source.
    async fn get_schema(&self) -> Result<Schema, ServiceError>;

    /// Submit an item together with its content.
    async fn index_item_and_content(
        &self,
        item: Item,
        content: ContentPayload,
        content_hash: Option<String>,
        format: ContentFormat,
        mode: RequestMode,
    ) -> Result<Operation, ServiceError>;

    /// Delete an item. `version` must be greater than the version of the stored item.
    async fn delete_item(
        &self,
        id: &str,
        version: Vec<u8>,
        mode: RequestMode,
    ) -> Result<Operation, ServiceError>;

    fn is_running(&self) -> bool;

    async fn start(&self) -> Result<(), ServiceError>;

    async fn stop(&self) -> Result<(), ServiceError>;
}

/// Configured default ACL policy.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait DefaultAcl: Send + Sync {
    /// Apply the policy to `item` if the policy is enabled. Returns whether the
    /// item's ACL is now governed by the policy.
    fn apply_to_if_enabled(&self, item: &mut Item) -> bool;
}

/// Factory and environment access for the writer.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Helper: Send + Sync {
    /// Read and parse the backend-client configuration file.
    fn load_config(&self, path: &Path) -> Result<Configuration, ConfigError>;

    fn create_indexing_service(
        &self,
        config: &Configuration,
    ) -> Result<Box<dyn IndexingService>, ClientCreationError>;

    fn init_default_acl(&self, config: &Configuration) -> Result<Box<dyn DefaultAcl>, ConfigError>;

    fn current_time_millis(&self) -> i64;
}

/// Parameters handed to [`IndexWriter::open`], keyed like `gcs.config.file`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexWriterParams {
    params: HashMap<String, String>,
}

impl IndexWriterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for IndexWriterParams {
    fn from(params: HashMap<String, String>) -> Self {
        Self { params }
    }
}

/// A sink for crawled documents, driven sequentially by a batch job.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IndexWriter: Send {
    async fn open(&mut self, params: &IndexWriterParams) -> Result<(), IndexWriterError>;

    async fn write(&mut self, doc: &Document) -> Result<(), IndexWriterError>;

    async fn update(&mut self, doc: &Document) -> Result<(), IndexWriterError>;

    async fn delete(&mut self, key: &str) -> Result<(), IndexWriterError>;

    async fn commit(&mut self) -> Result<(), IndexWriterError>;

    async fn close(&mut self);

    fn describe(&self) -> String;
}
