/// `load_config` module: reads the YAML backend-client configuration and injects secrets from the environment.
///
/// This is the only place where the user-supplied configuration file is parsed.
///
/// # Responsibilities
/// - Parse the YAML file named by `gcs.config.file` into [`Configuration`]
/// - Fill `api.access_token` from `GCS_ACCESS_TOKEN` when the file leaves it out
/// - Reject configurations the backend client cannot work with (no source id)
///
/// # Errors
/// Failures are reported as [`ConfigError`] so the writer can wrap them in its
/// own open error. The CLI adds `anyhow` context on top.
use gcs_indexer_core::config::Configuration;
use gcs_indexer_core::error::ConfigError;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Environment variable that supplies the bearer token.
pub const ACCESS_TOKEN_ENV: &str = "GCS_ACCESS_TOKEN";

/// Loads the YAML config at `path`, then injects the access token from the environment if needed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigError> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        ConfigError::Read {
            path: path_ref.display().to_string(),
            source: e,
        }
    })?;

    let mut config = parse_config(&content).map_err(|e| {
        error!(error = %e, config_path = ?path_ref, "Failed to parse config YAML");
        e
    })?;

    if config.api.access_token.is_none() {
        config.api.access_token = env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
    }

    info!(
        config_path = ?path_ref,
        source_id = %config.api.source_id,
        access_token_set = config.api.access_token.is_some(),
        "Parsed config YAML successfully"
    );
    Ok(config)
}

/// Parses and validates configuration YAML without touching the environment.
pub fn parse_config(content: &str) -> Result<Configuration, ConfigError> {
    let config: Configuration =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    if config.api.source_id.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "api.source_id must be set".to_string(),
        ));
    }
    Ok(config)
}
