use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Default document field for `metadata.title`.
pub const ITEM_METADATA_TITLE_DEFAULT: &str = "title";
/// Default document field for `metadata.update_time`.
pub const ITEM_METADATA_UPDATE_TIME_DEFAULT: &str = "lastModified";

/// Backend-client configuration, as loaded from the file named by `gcs.config.file`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub item_metadata: ItemMetadataConfig,
    #[serde(default)]
    pub default_acl: DefaultAclConfig,
}

impl Configuration {
    pub fn trace_loaded(&self) {
        info!(
            service_url = %self.api.service_url,
            source_id = %self.api.source_id,
            object_type = self.item_metadata.object_type.as_deref().unwrap_or("<none>"),
            default_acl_mode = ?self.default_acl.mode,
            "Loaded Configuration"
        );
        debug!(item_metadata = ?self.item_metadata, "Configuration loaded (item metadata)");
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default)]
    pub source_id: String,
    /// Bearer token. Usually left out of the file and supplied via the environment.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            source_id: String::new(),
            access_token: None,
        }
    }
}

// The token stays out of logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("service_url", &self.service_url)
            .field("source_id", &self.source_id)
            .field("access_token_set", &self.access_token.is_some())
            .finish()
    }
}

fn default_service_url() -> String {
    "https://cloudsearch.googleapis.com".to_string()
}

/// Which document fields feed item metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadataConfig {
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(default = "default_update_time_field")]
    pub update_time_field: String,
    #[serde(default)]
    pub create_time_field: Option<String>,
    #[serde(default)]
    pub content_language: Option<String>,
    /// Schema object definition that structured data targets.
    #[serde(default)]
    pub object_type: Option<String>,
}

impl Default for ItemMetadataConfig {
    fn default() -> Self {
        Self {
            title_field: default_title_field(),
            update_time_field: default_update_time_field(),
            create_time_field: None,
            content_language: None,
            object_type: None,
        }
    }
}

fn default_title_field() -> String {
    ITEM_METADATA_TITLE_DEFAULT.to_string()
}

fn default_update_time_field() -> String {
    ITEM_METADATA_UPDATE_TIME_DEFAULT.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultAclMode {
    #[default]
    None,
    Fallback,
    Append,
    Override,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrincipalList {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl PrincipalList {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultAclConfig {
    #[serde(default)]
    pub mode: DefaultAclMode,
    /// Grant the whole customer domain read access.
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub readers: PrincipalList,
    #[serde(default)]
    pub denied: PrincipalList,
}

/// Set-once holder for the backend-client configuration.
///
/// Shared via `Arc` between writers that should load the configuration only once.
/// The first successful [`ConfigState::initialize`] wins; later calls keep the
/// stored value.
#[derive(Debug, Default)]
pub struct ConfigState {
    inner: OnceLock<Arc<Configuration>>,
}

impl ConfigState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard that is already initialized with `config`.
    pub fn initialized(config: Configuration) -> Self {
        let state = Self::new();
        state.initialize(config);
        state
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.get().is_some()
    }

    pub fn get(&self) -> Option<Arc<Configuration>> {
        self.inner.get().cloned()
    }

    /// Store `config` unless a configuration is already present, returning the stored one.
    pub fn initialize(&self, config: Configuration) -> Arc<Configuration> {
        self.inner.get_or_init(|| Arc::new(config)).clone()
    }
}
