//! Property source serving values supplied up front.

use quick_links_ports::{BoxFuture, PropertyRequest, PropertySourcePort, PropertyValues};
use quick_links_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::path::Path;

/// Answers every request from one fixed value map.
///
/// Used when the host passes record values alongside the render request,
/// and by the CLI with a JSON file of values.
#[derive(Debug, Clone, Default)]
pub struct StaticPropertySource {
    values: PropertyValues,
}

impl StaticPropertySource {
    /// Wrap an in-memory value map.
    #[must_use]
    pub const fn new(values: PropertyValues) -> Self {
        Self { values }
    }

    /// Parse a JSON object of property values (flat or `{value}`-wrapped).
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map(Self::new).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("property values must be a JSON object: {error}"),
            )
        })
    }

    /// Read [`Self::from_json`] input from a file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|error| {
            ErrorEnvelope::from(error).with_metadata("path", path.display().to_string())
        })?;
        Self::from_json(&contents).map_err(|error| {
            error.with_metadata("path", path.display().to_string())
        })
    }
}

impl PropertySourcePort for StaticPropertySource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    fn fetch(
        &self,
        _ctx: &RequestContext,
        request: PropertyRequest,
    ) -> BoxFuture<'_, Result<PropertyValues>> {
        let selected = request
            .properties
            .iter()
            .filter_map(|name| {
                self.values
                    .get(name.as_str())
                    .map(|value| (name.as_str().to_owned(), value.clone()))
            })
            .collect();
        Box::pin(async move { Ok(selected) })
    }
}
