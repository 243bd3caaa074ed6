//! Config loading helpers for CLI surfaces.

use crate::InfraResult;
use quick_links_config::{QuickLinksEnv, ValidatedConfig, load_config_from_path, to_pretty_json};
use quick_links_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::Path;

/// Load and validate the effective config from an explicit env map.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<ValidatedConfig> {
    let env = QuickLinksEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_config_from_path(config_path, overrides_json, &env)
}

/// Load and validate the effective config, returning deterministic pretty
/// JSON with credentials redacted.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<String> {
    let config = load_effective_config(env, config_path, overrides_json)?;
    to_pretty_json(&config.redacted())
}
