//! Composition root: validated config to wired use-case dependencies.

use crate::InfraResult;
use crate::logger_factory::{LogFormat, build_logger};
use crate::property_factory::build_property_source;
use crate::store_factory::build_settings_store;
use quick_links_app::{LoadSettingsDeps, RenderQuickLinksDeps};
use quick_links_config::ValidatedConfig;
use quick_links_domain::{ObjectType, PortalId, RecordId};
use quick_links_ports::{LogLevel, LoggerPort, PropertySourcePort, RecordContext, SettingsStorePort};
use quick_links_shared::{ErrorCode, ErrorEnvelope};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inputs that do not come from the config file.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Directory relative config paths resolve against.
    pub root: PathBuf,
    /// Property values file forcing the static source.
    pub values_file: Option<PathBuf>,
    /// Use-case log output.
    pub log_format: LogFormat,
    /// Minimum level for JSON logs.
    pub log_level: Option<LogLevel>,
}

/// Adapters selected for one invocation.
pub struct QuickLinksRuntime {
    config: ValidatedConfig,
    store: Arc<dyn SettingsStorePort>,
    properties: Arc<dyn PropertySourcePort>,
    logger: Arc<dyn LoggerPort>,
}

impl QuickLinksRuntime {
    /// Select and initialize every adapter named by `config`.
    pub async fn build(config: ValidatedConfig, options: &RuntimeOptions) -> InfraResult<Self> {
        let store = build_settings_store(&config, &options.root).await?;
        let properties =
            build_property_source(&config, &options.root, options.values_file.as_deref()).await?;
        let logger = build_logger(options.log_format, options.log_level.unwrap_or(LogLevel::Info));
        tracing::debug!(
            store = store.backend_name(),
            properties = properties.source_name(),
            "runtime ready"
        );
        Ok(Self {
            config,
            store,
            properties,
            logger,
        })
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Selected settings store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn SettingsStorePort> {
        Arc::clone(&self.store)
    }

    /// Selected logger.
    #[must_use]
    pub fn logger(&self) -> Arc<dyn LoggerPort> {
        Arc::clone(&self.logger)
    }

    /// Dependencies for load-settings.
    #[must_use]
    pub fn load_deps(&self) -> LoadSettingsDeps {
        LoadSettingsDeps {
            store: self.store(),
            logger: Some(self.logger()),
        }
    }

    /// Dependencies for render-quick-links.
    #[must_use]
    pub fn render_deps(&self) -> RenderQuickLinksDeps {
        RenderQuickLinksDeps {
            store: self.store(),
            properties: Arc::clone(&self.properties),
            logger: Some(self.logger()),
        }
    }

    /// Portal from the caller, else from config.
    pub fn portal_id(&self, explicit: Option<&str>) -> InfraResult<PortalId> {
        match explicit {
            Some(raw) => PortalId::parse(raw).map_err(ErrorEnvelope::from),
            None => self.config.portal_id().cloned().ok_or_else(|| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "portal id is required; pass --portal or set portalId / QL_PORTAL_ID",
                )
            }),
        }
    }

    /// Record context from caller input with config defaults.
    pub fn record_context(
        &self,
        portal: Option<&str>,
        object_type: Option<&str>,
        record_id: Option<&str>,
    ) -> InfraResult<RecordContext> {
        let object_type = match object_type {
            Some(raw) => ObjectType::parse(raw).map_err(ErrorEnvelope::from)?,
            None => self.config.default_object_type().clone(),
        };
        Ok(RecordContext {
            portal_id: self.portal_id(portal)?,
            object_type,
            record_id: record_id
                .map(RecordId::parse)
                .transpose()
                .map_err(ErrorEnvelope::from)?,
        })
    }
}

/// Root for relative config paths: the config file's directory, else the
/// current directory.
pub fn config_root(config_path: Option<&Path>) -> PathBuf {
    config_path
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_root_uses_config_directory() {
        assert_eq!(
            config_root(Some(Path::new("/etc/ql/quick-links.toml"))),
            PathBuf::from("/etc/ql")
        );
        assert_eq!(config_root(Some(Path::new("quick-links.toml"))), PathBuf::from("."));
        assert_eq!(config_root(None), PathBuf::from("."));
    }
}
