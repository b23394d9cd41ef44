//! Integration tests for odata-config

use odata_config::*;
use odata_core::{negotiate, ContentType, ResourceKind};
use std::env;
use std::fs;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

// Some tests set variables while the logger and loaders read the
// environment, so every test in this file holds this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_toml_file_drives_negotiation() {
    let _env = env_lock();
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "formats.toml",
        r#"
        [[mappings]]
        alias = "csv"
        content_type = "text/csv;charset=utf-8"
        resource_kinds = ["entity_collection"]
        "#,
    );

    let config = NegotiationConfig::from_file(&path).unwrap();

    let ct = negotiate(ResourceKind::EntityCollection, Some("CSV"), &[], &config).unwrap();
    assert_eq!(ct.render(), "text/csv;charset=utf-8");

    let ct = negotiate(ResourceKind::EntityCollection, None, &["text/csv"], &config).unwrap();
    assert_eq!(ct.render(), "text/csv;charset=utf-8");

    // only offered where configured
    let err = negotiate(ResourceKind::Entity, Some("csv"), &[], &config).unwrap_err();
    assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
}

#[test]
fn test_json_file_keeps_built_in_defaults() {
    let _env = env_lock();
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "formats.json",
        r#"{"mappings": [{"alias": "atom", "content_type": "application/atom+xml"}]}"#,
    );

    let config = NegotiationConfig::from_file(&path).unwrap();

    for kind in ResourceKind::ALL {
        let ct = negotiate(kind, None, &[], &config).unwrap();
        assert_eq!(&ct, kind.primary_default());
    }

    let ct = negotiate(ResourceKind::Metadata, None, &["application/atom+xml"], &config).unwrap();
    assert_eq!(ct, ContentType::application_atom_xml());
}

#[test]
fn test_dotenv_file() {
    let _env = env_lock();
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        ".env",
        "# formats\nODATA_FORMAT_TSV=text/tab-separated-values\nODATA_LOG_LEVEL=info\n",
    );

    let config = NegotiationConfig::from_file(&path).unwrap();
    assert_eq!(config.mappings.len(), 1);
    assert_eq!(config.mappings[0].alias, "tsv");
}

#[test]
fn test_invalid_file_is_rejected() {
    let _env = env_lock();
    let dir = TempDir::new().unwrap();
    let bad_alias = write(
        &dir,
        "bad.json",
        r#"{"mappings": [{"alias": "a/b", "content_type": "text/csv"}]}"#,
    );
    assert!(matches!(
        NegotiationConfig::from_file(&bad_alias),
        Err(ConfigError::ValidationError(_))
    ));

    let unknown = write(&dir, "formats.yaml", "mappings: []");
    assert!(matches!(
        NegotiationConfig::from_file(&unknown),
        Err(ConfigError::LoadError(_))
    ));

    assert!(NegotiationConfig::from_file(dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_builder_env_and_prefix() {
    let _env = env_lock();

    unsafe {
        env::set_var("ODATA_IT_BUILDER_FORMAT_CSV", "text/csv");
    }

    let config = NegotiationConfig::builder()
        .with_prefix("ODATA_IT_BUILDER")
        .load_env()
        .add_mapping(FormatMappingEntry::new("xml", ContentType::application_xml()))
        .build()
        .unwrap();

    let aliases: Vec<&str> = config.mappings.iter().map(|m| m.alias.as_str()).collect();
    assert_eq!(aliases, vec!["csv", "xml"]);

    unsafe {
        env::remove_var("ODATA_IT_BUILDER_FORMAT_CSV");
    }
}

#[test]
fn test_builder_source_order() {
    let _env = env_lock();

    unsafe {
        env::set_var("ODATA_IT_ORDER_FORMAT_REPORT", "text/csv");
    }

    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "formats.toml",
        r#"
        [[mappings]]
        alias = "report"
        content_type = "application/pdf"
        "#,
    );

    let config = NegotiationConfig::builder()
        .with_prefix("ODATA_IT_ORDER")
        .load_env()
        .add_file(path)
        .build()
        .unwrap();

    // environment first, so it wins the alias
    let ct = negotiate(ResourceKind::Entity, Some("report"), &[], &config).unwrap();
    assert_eq!(ct.render(), "text/csv");

    unsafe {
        env::remove_var("ODATA_IT_ORDER_FORMAT_REPORT");
    }
}

#[test]
fn test_builder_explicit_dotenv_path() {
    let _env = env_lock();

    let dir = TempDir::new().unwrap();
    let path = write(&dir, "custom.env", "ODATA_IT_DOTENV_FORMAT_YAML=application/yaml\n");

    let config = NegotiationConfig::builder()
        .with_prefix("ODATA_IT_DOTENV")
        .load_dotenv(Some(path))
        .build()
        .unwrap();

    assert_eq!(config.mappings.len(), 1);
    assert_eq!(config.mappings[0].content_type.render(), "application/yaml");

    let missing = NegotiationConfig::builder()
        .load_dotenv(Some(dir.path().join("nope.env").to_string_lossy().into_owned()))
        .build();
    assert!(matches!(missing, Err(ConfigError::LoadError(_))));

    unsafe {
        env::remove_var("ODATA_IT_DOTENV_FORMAT_YAML");
    }
}

#[test]
fn test_built_in_alias_not_overridden() {
    let _env = env_lock();
    let config = NegotiationConfig::builder()
        .add_mapping(FormatMappingEntry::new("json", ContentType::text_plain()))
        .build()
        .unwrap();

    let ct = negotiate(ResourceKind::Entity, Some("json"), &[], &config).unwrap();
    assert_eq!(ct, ContentType::json_minimal());
}
