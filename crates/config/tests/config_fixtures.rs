//! Integration tests for parsing config fixtures from the workspace.

use quick_links_config::{
    CURRENT_CONFIG_VERSION, PropertySourceKind, QuickLinksEnv, SettingsBackend,
    load_config_from_path, parse_config_json, parse_config_toml,
};
use quick_links_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn fixture_path(relative: &str) -> PathBuf {
    workspace_root().join("fixtures").join(relative)
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixture_path(relative))?)
}

#[test]
fn parses_valid_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/quick-links.valid.json")?;
    let config = parse_config_json(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.settings.backend, SettingsBackend::Remote);
    assert_eq!(config.settings.remote.timeout_ms, 4_500);
    assert_eq!(
        config.settings.remote.api_token, None,
        "blank tokens should normalize to None"
    );
    assert_eq!(config.properties.source, PropertySourceKind::Remote);
    assert_eq!(config.portal_id().map(|id| id.as_str()), Some("4242"));
    assert_eq!(config.default_object_type().as_str(), "COMPANY");
    Ok(())
}

#[test]
fn parses_default_toml_fixture() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/quick-links.default.toml")?;
    let config = parse_config_toml(&contents)?;

    assert_eq!(config.settings.backend, SettingsBackend::Local);
    assert_eq!(config.settings.local.directory.as_ref(), ".quick-links");
    assert_eq!(
        config.properties.static_path.as_deref(),
        Some("fixtures/properties/record.json")
    );
    Ok(())
}

#[test]
fn invalid_fixture_reports_error_code() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("config/quick-links.invalid.json")?;
    let error = parse_config_json(&contents)
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "invalid_timeout"));
    assert_eq!(
        error.metadata.get("section").map(String::as_str),
        Some("settings.remote")
    );
    assert_eq!(
        error.metadata.get("field").map(String::as_str),
        Some("timeoutMs")
    );
    Ok(())
}

#[test]
fn loads_toml_by_extension() -> Result<(), Box<dyn Error>> {
    let path = fixture_path("config/quick-links.default.toml");
    let config = load_config_from_path(Some(&path), None, &QuickLinksEnv::default())?;
    assert_eq!(config.properties.source, PropertySourceKind::Static);
    Ok(())
}

#[test]
fn missing_config_file_has_dedicated_code() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.json");
    let error = load_config_from_path(Some(&path), None, &QuickLinksEnv::default())
        .err()
        .ok_or_else(|| std::io::Error::other("expected missing file error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "config_file_not_found"));
    assert!(error.metadata.contains_key("path"));
    Ok(())
}
