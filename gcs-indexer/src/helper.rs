//! Production [`Helper`]: YAML config loading, the HTTP indexing client, the configured ACL and the system clock.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use gcs_indexer_core::acl::ConfiguredDefaultAcl;
use gcs_indexer_core::config::Configuration;
use gcs_indexer_core::contract::{DefaultAcl, Helper, IndexingService};
use gcs_indexer_core::error::{ClientCreationError, ConfigError};

use crate::load_config::load_config;
use crate::upload::CloudSearchClient;

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHelper;

impl Helper for DefaultHelper {
    fn load_config(&self, path: &Path) -> Result<Configuration, ConfigError> {
        load_config(path)
    }

    fn create_indexing_service(
        &self,
        config: &Configuration,
    ) -> Result<Box<dyn IndexingService>, ClientCreationError> {
        Ok(Box::new(CloudSearchClient::from_config(config)?))
    }

    fn init_default_acl(&self, config: &Configuration) -> Result<Box<dyn DefaultAcl>, ConfigError> {
        let acl = ConfiguredDefaultAcl::from_config(&config.default_acl)?;
        tracing::debug!(mode = ?acl.mode(), "Default ACL policy initialized");
        Ok(Box::new(acl))
    }

    fn current_time_millis(&self) -> i64 {
        system_time_millis()
    }
}

/// Milliseconds since the Unix epoch, or 0 if the system clock is before it.
pub fn system_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
