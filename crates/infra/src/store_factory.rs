//! Settings store selection and initialization.

use crate::InfraResult;
use quick_links_adapters::{
    HostSettingsStore, HttpEndpointConfig, HttpSettingsStore, LocalFileSettingsStore,
};
use quick_links_config::{RemoteEndpointConfig, SettingsBackend, ValidatedConfig};
use quick_links_ports::SettingsStorePort;
use quick_links_shared::{ErrorCode, ErrorEnvelope, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build the settings store selected by `settings.backend`.
///
/// Relative paths in the config are resolved against `root`.
pub async fn build_settings_store(
    config: &ValidatedConfig,
    root: &Path,
) -> InfraResult<Arc<dyn SettingsStorePort>> {
    let settings = &config.settings;
    tracing::debug!(backend = settings.backend.as_str(), "selecting settings store");
    match settings.backend {
        SettingsBackend::Remote => {
            let endpoint = endpoint_config(&settings.remote, "settings.remote")?;
            Ok(Arc::new(HttpSettingsStore::new(&endpoint)?))
        },
        SettingsBackend::Host => match settings.host.path.as_deref() {
            Some(path) => Ok(Arc::new(
                HostSettingsStore::open(resolve_path(root, path)).await,
            )),
            None => Ok(Arc::new(HostSettingsStore::in_memory())),
        },
        SettingsBackend::Local => Ok(Arc::new(LocalFileSettingsStore::new(resolve_path(
            root,
            &settings.local.directory,
        )))),
    }
}

/// Convert a validated remote section into adapter connection settings.
pub fn endpoint_config(
    remote: &RemoteEndpointConfig,
    section: &'static str,
) -> InfraResult<HttpEndpointConfig> {
    let base_url = remote.base_url.clone().ok_or_else(|| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "missing_field"),
            format!("{section}.baseUrl is required"),
        )
        .with_metadata("section", section)
        .with_metadata("field", "baseUrl")
    })?;
    Ok(HttpEndpointConfig {
        base_url,
        timeout_ms: remote.timeout_ms,
        api_token: remote.api_token.as_deref().map(SecretString::new),
    })
}

pub(crate) fn resolve_path(root: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
