//! Property source selection and initialization.

use crate::InfraResult;
use crate::store_factory::{endpoint_config, resolve_path};
use quick_links_adapters::{HttpPropertySource, StaticPropertySource};
use quick_links_config::{PropertySourceKind, ValidatedConfig};
use quick_links_ports::PropertySourcePort;
use std::path::Path;
use std::sync::Arc;

/// Build the property source selected by `properties.source`.
///
/// `values_file` overrides `properties.staticPath` and forces the static
/// source. A static source without any file answers every request with no
/// values, which renders the empty state.
pub async fn build_property_source(
    config: &ValidatedConfig,
    root: &Path,
    values_file: Option<&Path>,
) -> InfraResult<Arc<dyn PropertySourcePort>> {
    let properties = &config.properties;
    if let Some(path) = values_file {
        return Ok(Arc::new(StaticPropertySource::from_file(path).await?));
    }

    tracing::debug!(source = properties.source.as_str(), "selecting property source");
    match properties.source {
        PropertySourceKind::Remote => {
            let endpoint = endpoint_config(&properties.remote, "properties.remote")?;
            Ok(Arc::new(HttpPropertySource::new(&endpoint)?))
        },
        PropertySourceKind::Static => match properties.static_path.as_deref() {
            Some(path) => Ok(Arc::new(
                StaticPropertySource::from_file(&resolve_path(root, path)).await?,
            )),
            None => Ok(Arc::new(StaticPropertySource::default())),
        },
    }
}
