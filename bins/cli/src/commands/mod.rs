//! CLI command handlers.

pub mod config;
pub mod resolve;
pub mod settings;

pub use config::{run_config_show, run_config_validate};
pub use resolve::{ResolveArgs, run_resolve};
pub use settings::{SettingsAction, run_settings};

use crate::format::OutputMode;
use quick_links_config::ValidatedConfig;
use quick_links_infra::{
    InfraResult, LogFormat, QuickLinksRuntime, RuntimeOptions, config_root, load_effective_config,
};
use quick_links_ports::LogLevel;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Env prefix for every quick-links variable.
const ENV_PREFIX: &str = "QL_";

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct CommandEnv {
    pub mode: OutputMode,
    pub config_path: Option<PathBuf>,
    pub overrides_json: Option<String>,
    pub log_format: LogFormat,
}

impl CommandEnv {
    /// Effective config: `QL_*` env over overrides over file over defaults.
    pub fn load_config(&self) -> InfraResult<ValidatedConfig> {
        load_effective_config(
            &collect_scoped_env(ENV_PREFIX),
            self.config_path.as_deref(),
            self.overrides_json.as_deref(),
        )
    }

    /// Load the config and wire the adapters it selects.
    pub async fn runtime(&self, values_file: Option<&Path>) -> InfraResult<QuickLinksRuntime> {
        let config = self.load_config()?;
        let options = RuntimeOptions {
            root: config_root(self.config_path.as_deref()),
            values_file: values_file.map(Path::to_path_buf),
            log_format: self.log_format,
            log_level: std::env::var("QL_LOG")
                .ok()
                .as_deref()
                .and_then(LogLevel::parse),
        };
        QuickLinksRuntime::build(config, &options).await
    }
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}
