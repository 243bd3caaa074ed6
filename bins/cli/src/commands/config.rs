//! Config command handlers.

use crate::commands::CommandEnv;
use crate::error::CliError;
use crate::output::{CliOutput, format_error_output, format_success};
use quick_links_config::to_pretty_toml;
use quick_links_domain::PortalId;
use serde_json::json;

/// Print the effective config with credentials redacted.
pub fn run_config_show(env: &CommandEnv) -> Result<CliOutput, CliError> {
    let config = match env.load_config() {
        Ok(config) => config.redacted(),
        Err(error) => return Ok(format_error_output(env.mode, &error)),
    };
    let text = match to_pretty_toml(&config) {
        Ok(text) => text,
        Err(error) => return Ok(format_error_output(env.mode, &error)),
    };
    let payload = serde_json::to_value(&config)?;
    format_success(env.mode, "config.show", payload, || text, &[])
}

/// Validate the effective config.
pub fn run_config_validate(env: &CommandEnv) -> Result<CliOutput, CliError> {
    let config = match env.load_config() {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(env.mode, &error)),
    };
    let backend = config.settings.backend.as_str();
    let source = config.properties.source.as_str();
    let payload = json!({
        "settingsBackend": backend,
        "propertySource": source,
        "portalId": config.portal_id().map(PortalId::as_str),
    });
    format_success(
        env.mode,
        "config.validate",
        payload,
        || format!("status: ok\nsettings backend: {backend}\nproperty source: {source}\n"),
        &[],
    )
}
