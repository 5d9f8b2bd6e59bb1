#![doc = "HTTP indexing client: implements the core `IndexingService` contract against the hosted search REST API."]
//
//! # Indexing client (CLI <-> backend)
//!
//! [`CloudSearchClient`] is the production [`IndexingService`]. It owns a
//! `reqwest` client, authenticates with a bearer token and speaks the
//! datasource indexing endpoints:
//!
//! - `GET  {service_url}/v1/indexing/datasources/{source_id}/schema`
//! - `POST {service_url}/v1/indexing/datasources/{source_id}/items/{id}:index`
//! - `DELETE {service_url}/v1/indexing/datasources/{source_id}/items/{id}`
//!
//! Content is sent inline, base64 encoded. Calls made while the client is
//! stopped fail with [`ServiceError::NotRunning`].

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

use gcs_indexer_core::config::Configuration;
use gcs_indexer_core::contract::IndexingService;
use gcs_indexer_core::error::{ClientCreationError, ServiceError};
use gcs_indexer_core::item::{ContentFormat, ContentPayload, Item, Operation, RequestMode};
use gcs_indexer_core::schema::Schema;

use crate::helper::system_time_millis;

pub struct CloudSearchClient {
    http: reqwest::Client,
    base_url: Url,
    source_id: String,
    access_token: String,
    running: AtomicBool,
    /// Epoch millis used to stamp item versions.
    clock: fn() -> i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexItemRequest<'a> {
    item: IndexedItem<'a>,
    mode: RequestMode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexedItem<'a> {
    #[serde(flatten)]
    item: &'a Item,
    version: String,
    content: ItemContent,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemContent {
    inline_content: String,
    content_format: ContentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

impl CloudSearchClient {
    pub fn from_config(config: &Configuration) -> Result<Self, ClientCreationError> {
        let access_token = config.api.access_token.clone().ok_or_else(|| {
            tracing::error!("No access token in config or environment");
            ClientCreationError::Credentials(
                "set api.access_token or the GCS_ACCESS_TOKEN environment variable".to_string(),
            )
        })?;
        if config.api.source_id.trim().is_empty() {
            return Err(ClientCreationError::Settings(
                "api.source_id must be set".to_string(),
            ));
        }
        let base_url = Url::parse(&config.api.service_url).map_err(|e| {
            ClientCreationError::Settings(format!(
                "invalid api.service_url '{}': {e}",
                config.api.service_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientCreationError::Settings(format!(
                "api.service_url '{}' cannot carry a path",
                config.api.service_url
            )));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("gcs-indexer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientCreationError::Settings(e.to_string()))?;

        tracing::info!(
            service_url = %base_url,
            source_id = %config.api.source_id,
            "Initialized CloudSearchClient from configuration"
        );
        Ok(Self {
            http,
            base_url,
            source_id: config.api.source_id.clone(),
            access_token,
            running: AtomicBool::new(false),
            clock: system_time_millis,
        })
    }

    /// Replaces the clock used for item versions.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// `datasources/{source_id}/items/{id}`, the name the backend expects in an item body.
    pub fn item_resource_name(&self, id: &str) -> String {
        format!("datasources/{}/items/{}", self.source_id, id)
    }

    fn version_now(&self) -> String {
        STANDARD.encode((self.clock)().to_string())
    }

    /// URL under the datasource, with each segment percent-encoded.
    fn datasource_url(&self, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "indexing", "datasources", self.source_id.as_str()])
                .extend(tail);
        }
        url
    }

    fn ensure_running(&self) -> Result<(), ServiceError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(ServiceError::NotRunning)
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ServiceError::Http(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn operation(response: reqwest::Response) -> Result<Operation, ServiceError> {
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Http(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Operation::default());
        }
        serde_json::from_str(&body)
            .map_err(|e| ServiceError::Http(format!("invalid operation in response: {e}")))
    }
}

#[async_trait]
impl IndexingService for CloudSearchClient {
    async fn get_schema(&self) -> Result<Schema, ServiceError> {
        self.ensure_running()?;
        let url = self.datasource_url(&["schema"]);
        tracing::info!(source_id = %self.source_id, "Fetching datasource schema");

        match self.send(self.http.get(url)).await {
            Ok(response) => response
                .json::<Schema>()
                .await
                .map_err(|e| ServiceError::Http(format!("invalid schema in response: {e}"))),
            Err(ServiceError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                tracing::info!(source_id = %self.source_id, "Datasource has no schema");
                Ok(Schema::default())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch datasource schema");
                Err(e)
            }
        }
    }

    async fn index_item_and_content(
        &self,
        mut item: Item,
        content: ContentPayload,
        content_hash: Option<String>,
        format: ContentFormat,
        mode: RequestMode,
    ) -> Result<Operation, ServiceError> {
        self.ensure_running()?;
        let segment = format!("{}:index", item.name);
        let url = self.datasource_url(&["items", segment.as_str()]);
        tracing::debug!(
            item = %item.name,
            size = content.len(),
            format = ?format,
            "Uploading item with inline content"
        );

        // The URL carries the bare id, the body the full resource name.
        item.name = self.item_resource_name(&item.name);
        let body = IndexItemRequest {
            item: IndexedItem {
                item: &item,
                version: self.version_now(),
                content: ItemContent {
                    inline_content: STANDARD.encode(&content.bytes),
                    content_format: format,
                    hash: content_hash,
                },
            },
            mode,
        };
        let response = self.send(self.http.post(url).json(&body)).await?;
        Self::operation(response).await
    }

    async fn delete_item(
        &self,
        id: &str,
        version: Vec<u8>,
        mode: RequestMode,
    ) -> Result<Operation, ServiceError> {
        self.ensure_running()?;
        let url = self.datasource_url(&["items", id]);
        tracing::info!(item = id, "Deleting item");

        let version = STANDARD.encode(version);
        let request = self
            .http
            .delete(url)
            .query(&[("version", version.as_str()), ("mode", mode.as_str())]);
        let response = self.send(request).await?;
        Self::operation(response).await
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.running.store(true, Ordering::SeqCst);
        tracing::info!(source_id = %self.source_id, "Indexing client started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.running.store(false, Ordering::SeqCst);
        tracing::info!(source_id = %self.source_id, "Indexing client stopped");
        Ok(())
    }
}
