use gcs_indexer::load_config::{load_config, parse_config, ACCESS_TOKEN_ENV};
use gcs_indexer_core::config::DefaultAclMode;
use gcs_indexer_core::error::ConfigError;
use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).expect("write config");
    file
}

/// A full config yields every section, with the token taken from the file.
#[test]
#[serial]
fn test_load_config_full_file() {
    env::remove_var(ACCESS_TOKEN_ENV);
    let file = config_file(
        r#"
api:
  service_url: "http://localhost:9000"
  source_id: "datasource-1"
  access_token: "from-file"
item_metadata:
  title_field: "heading"
  update_time_field: "modified"
  create_time_field: "created"
  content_language: "en"
  object_type: "schema1"
default_acl:
  mode: override
  public: false
  readers:
    users: ["alice@example.com"]
    groups: ["eng@example.com"]
  denied:
    users: ["mallory@example.com"]
"#,
    );

    let config = load_config(file.path()).expect("config should load");

    assert_eq!(config.api.service_url, "http://localhost:9000");
    assert_eq!(config.api.source_id, "datasource-1");
    assert_eq!(config.api.access_token.as_deref(), Some("from-file"));
    assert_eq!(config.item_metadata.title_field, "heading");
    assert_eq!(config.item_metadata.update_time_field, "modified");
    assert_eq!(config.item_metadata.create_time_field.as_deref(), Some("created"));
    assert_eq!(config.item_metadata.content_language.as_deref(), Some("en"));
    assert_eq!(config.item_metadata.object_type.as_deref(), Some("schema1"));
    assert_eq!(config.default_acl.mode, DefaultAclMode::Override);
    assert_eq!(config.default_acl.readers.users, vec!["alice@example.com"]);
    assert_eq!(config.default_acl.readers.groups, vec!["eng@example.com"]);
    assert_eq!(config.default_acl.denied.users, vec!["mallory@example.com"]);
}

/// Only the source id is required; everything else falls back to defaults.
#[test]
#[serial]
fn test_load_config_minimal_file_uses_defaults() {
    env::remove_var(ACCESS_TOKEN_ENV);
    let file = config_file("api:\n  source_id: \"datasource-1\"\n");

    let config = load_config(file.path()).expect("config should load");

    assert_eq!(config.api.service_url, "https://cloudsearch.googleapis.com");
    assert_eq!(config.api.access_token, None);
    assert_eq!(config.item_metadata.title_field, "title");
    assert_eq!(config.item_metadata.update_time_field, "lastModified");
    assert_eq!(config.item_metadata.object_type, None);
    assert_eq!(config.default_acl.mode, DefaultAclMode::None);
}

#[test]
#[serial]
fn test_load_config_injects_token_from_env() {
    env::set_var(ACCESS_TOKEN_ENV, "from-env");
    let file = config_file("api:\n  source_id: \"datasource-1\"\n");

    let config = load_config(file.path()).expect("config should load");
    env::remove_var(ACCESS_TOKEN_ENV);

    assert_eq!(config.api.access_token.as_deref(), Some("from-env"));
}

#[test]
#[serial]
fn test_load_config_file_token_wins_over_env() {
    env::set_var(ACCESS_TOKEN_ENV, "from-env");
    let file = config_file("api:\n  source_id: \"s\"\n  access_token: \"from-file\"\n");

    let config = load_config(file.path()).expect("config should load");
    env::remove_var(ACCESS_TOKEN_ENV);

    assert_eq!(config.api.access_token.as_deref(), Some("from-file"));
}

#[test]
fn test_load_config_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("/definitely/not/here.yaml"));
}

#[test]
fn test_parse_config_rejects_invalid_yaml() {
    let err = parse_config("api: [unclosed").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_parse_config_requires_source_id() {
    let err = parse_config("item_metadata:\n  title_field: t\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_parse_config_rejects_unknown_acl_mode() {
    let err = parse_config("api:\n  source_id: s\ndefault_acl:\n  mode: sometimes\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
