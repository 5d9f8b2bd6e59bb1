//! Error types for the index writer and its collaborators.

use thiserror::Error;

/// Errors raised by an [`IndexingService`](crate::contract::IndexingService) implementation.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("indexing service is not running")]
    NotRunning,

    #[error("unexpected failure: {0}")]
    Runtime(String),
}

/// Failure to load or validate the backend-client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to construct a backend client.
#[derive(Error, Debug)]
pub enum ClientCreationError {
    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid client settings: {0}")]
    Settings(String),
}

/// Failure while turning a document into an item. Never reaches the writer's caller.
#[derive(Error, Debug, PartialEq)]
pub enum ItemBuildError {
    #[error("document has no '{0}' field")]
    MissingField(String),

    #[error("value '{value}' of property '{property}' is not a valid {expected}")]
    Coercion {
        property: String,
        value: String,
        expected: &'static str,
    },
}

/// Errors surfaced by [`CloudSearchIndexWriter`](crate::writer::CloudSearchIndexWriter).
#[derive(Error, Debug)]
pub enum IndexWriterError {
    #[error("Missing required configuration parameter: gcs.config.file")]
    MissingConfigPath,

    #[error("Failed to initialize SDK configuration. Check the configuration file and try again!")]
    ConfigInit(#[source] ConfigError),

    #[error("Unknown value for 'gcs.uploadFormat': {0}")]
    InvalidUploadFormat(String),

    #[error("failed to create IndexingService")]
    ClientCreation(#[source] ClientCreationError),

    #[error("failed to start IndexingService")]
    ClientStart(#[source] ServiceError),

    #[error("failed to initialize structured data from schema")]
    Schema(#[source] ServiceError),

    #[error("ContentType ('type') field is missing, please enable the crawler's content-type indexing!")]
    ContentTypeMissing,

    #[error("Error: binaryContent not available or not Base64 encoded. Please index with binary content in Base64!")]
    ContentDecode(#[source] Option<base64::DecodeError>),

    #[error("Text content ('content') field is missing, please enable the crawler's text indexing!")]
    ContentMissing,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("index writer is not open")]
    NotOpen,

    #[error("index writer has been closed")]
    Closed,

    #[error("failed to delete item '{id}'")]
    Delete {
        id: String,
        #[source]
        source: ServiceError,
    },
}

pub type Result<T> = std::result::Result<T, IndexWriterError>;
