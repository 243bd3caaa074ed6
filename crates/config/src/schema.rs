//! Configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Optional strings are trimmed; blanks become `None`.

use quick_links_domain::{ObjectType, PortalId};
use quick_links_shared::{ErrorCode, ErrorEnvelope, REDACTED};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default timeout for remote endpoints.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// Default directory for the local file settings store.
pub const DEFAULT_LOCAL_DIRECTORY: &str = ".quick-links";

/// Default record type used when the caller does not name one.
pub const DEFAULT_OBJECT_TYPE: &str = "CONTACT";

const REMOTE_TIMEOUT_MIN_MS: u64 = 100;
const REMOTE_TIMEOUT_MAX_MS: u64 = 120_000;

/// Strips credentials so URLs can be echoed in errors.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if (parsed.password().is_some() || !parsed.username().is_empty())
                && (parsed.set_username("").is_err() || parsed.set_password(None).is_err())
            {
                return "[invalid url: credentials]".to_string();
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Top-level quick-links configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct QuickLinksConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Settings persistence backend.
    pub settings: SettingsConfig,
    /// Record property source.
    pub properties: PropertiesConfig,
    /// Portal used when the caller does not pass one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_id: Option<Box<str>>,
    /// Record type used when the caller does not pass one.
    pub default_object_type: Box<str>,
}

impl Default for QuickLinksConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            settings: SettingsConfig::default(),
            properties: PropertiesConfig::default(),
            portal_id: None,
            default_object_type: DEFAULT_OBJECT_TYPE.into(),
        }
    }
}

impl QuickLinksConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        normalize_optional_trimmed(&mut self.portal_id);
        self.default_object_type = self.default_object_type.trim().into();

        self.settings.normalize();
        self.settings.validate()?;
        self.properties.normalize();
        self.properties.validate()?;

        let portal_id = self
            .portal_id
            .as_deref()
            .map(PortalId::parse)
            .transpose()
            .map_err(|_| ConfigSchemaError::InvalidValue {
                section: "root",
                field: "portalId",
                reason: "must be non-empty".into(),
            })?;
        let default_object_type = ObjectType::parse(&*self.default_object_type).map_err(|_| {
            ConfigSchemaError::MissingField {
                section: "root",
                field: "defaultObjectType",
            }
        })?;

        Ok(ValidatedConfig {
            raw: self,
            portal_id,
            default_object_type,
        })
    }

    /// Copy with every credential replaced by a placeholder, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for token in [
            &mut copy.settings.remote.api_token,
            &mut copy.properties.remote.api_token,
        ] {
            if token.is_some() {
                *token = Some(REDACTED.into());
            }
        }
        copy
    }
}

/// Validated config wrapper carrying parsed identifiers.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    raw: QuickLinksConfig,
    portal_id: Option<PortalId>,
    default_object_type: ObjectType,
}

impl ValidatedConfig {
    /// Default portal, if configured.
    #[must_use]
    pub const fn portal_id(&self) -> Option<&PortalId> {
        self.portal_id.as_ref()
    }

    /// Default record type.
    #[must_use]
    pub const fn default_object_type(&self) -> &ObjectType {
        &self.default_object_type
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> QuickLinksConfig {
        self.raw
    }
}

impl AsRef<QuickLinksConfig> for ValidatedConfig {
    fn as_ref(&self) -> &QuickLinksConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedConfig {
    type Target = QuickLinksConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Which settings store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingsBackend {
    /// Remote HTTP endpoint keyed by portal id.
    Remote,
    /// Host-provided key/value store.
    Host,
    /// One JSON file per portal on local storage.
    #[default]
    Local,
}

impl SettingsBackend {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Host => "host",
            Self::Local => "local",
        }
    }

    /// Parse from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "remote" | "http" => Some(Self::Remote),
            "host" => Some(Self::Host),
            "local" | "file" => Some(Self::Local),
            _ => None,
        }
    }
}

impl fmt::Display for SettingsBackend {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Remote HTTP endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RemoteEndpointConfig {
    /// Base URL (http/https).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Box<str>>,
    /// Request timeout (ms).
    pub timeout_ms: u64,
    /// Bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<Box<str>>,
}

impl Default for RemoteEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
            api_token: None,
        }
    }
}

impl RemoteEndpointConfig {
    fn normalize(&mut self) {
        normalize_optional_trimmed(&mut self.base_url);
        normalize_optional_trimmed(&mut self.api_token);
    }

    fn validate(&self, section: &'static str, required: bool) -> Result<(), ConfigSchemaError> {
        match self.base_url.as_deref() {
            Some(url) => validate_http_url(section, "baseUrl", url)?,
            None if required => {
                return Err(ConfigSchemaError::MissingField {
                    section,
                    field: "baseUrl",
                });
            },
            None => {},
        }
        if !(REMOTE_TIMEOUT_MIN_MS..=REMOTE_TIMEOUT_MAX_MS).contains(&self.timeout_ms) {
            return Err(ConfigSchemaError::TimeoutOutOfRange {
                section,
                field: "timeoutMs",
                value_ms: self.timeout_ms,
                min_ms: REMOTE_TIMEOUT_MIN_MS,
                max_ms: REMOTE_TIMEOUT_MAX_MS,
            });
        }
        Ok(())
    }
}

/// Host-provided store settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct HostStoreConfig {
    /// JSON file backing the host store; in-memory when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Box<str>>,
}

/// Local file store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LocalStoreConfig {
    /// Directory holding one `<portalId>.json` per portal.
    pub directory: Box<str>,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_LOCAL_DIRECTORY.into(),
        }
    }
}

/// Settings persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SettingsConfig {
    /// Selected backend.
    pub backend: SettingsBackend,
    /// Remote backend settings.
    pub remote: RemoteEndpointConfig,
    /// Host backend settings.
    pub host: HostStoreConfig,
    /// Local backend settings.
    pub local: LocalStoreConfig,
}

impl SettingsConfig {
    fn normalize(&mut self) {
        self.remote.normalize();
        normalize_optional_trimmed(&mut self.host.path);
        self.local.directory = self.local.directory.trim().into();
    }

    fn validate(&self) -> Result<(), ConfigSchemaError> {
        self.remote
            .validate("settings.remote", self.backend == SettingsBackend::Remote)?;
        if self.backend == SettingsBackend::Local && self.local.directory.is_empty() {
            return Err(ConfigSchemaError::MissingField {
                section: "settings.local",
                field: "directory",
            });
        }
        Ok(())
    }
}

/// Which property source implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertySourceKind {
    /// Values supplied up front (CLI file, host payload).
    #[default]
    Static,
    /// Remote CRM objects endpoint.
    Remote,
}

impl PropertySourceKind {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Remote => "remote",
        }
    }

    /// Parse from user or env input.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "static" | "file" => Some(Self::Static),
            "remote" | "http" => Some(Self::Remote),
            _ => None,
        }
    }
}

/// Record property source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PropertiesConfig {
    /// Selected source.
    pub source: PropertySourceKind,
    /// Remote source settings.
    pub remote: RemoteEndpointConfig,
    /// JSON file of property values for the static source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_path: Option<Box<str>>,
}

impl PropertiesConfig {
    fn normalize(&mut self) {
        self.remote.normalize();
        normalize_optional_trimmed(&mut self.static_path);
    }

    fn validate(&self) -> Result<(), ConfigSchemaError> {
        self.remote
            .validate("properties.remote", self.source == PropertySourceKind::Remote)
    }
}

/// Parse and validate a config from JSON.
pub fn parse_config_json(input: &str) -> Result<ValidatedConfig, ErrorEnvelope> {
    let config: QuickLinksConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Parse and validate a config from TOML.
pub fn parse_config_toml(input: &str) -> Result<ValidatedConfig, ErrorEnvelope> {
    let config: QuickLinksConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    #[error("unsupported config version: {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A timeout value is out of bounds.
    #[error("{section}.{field} must be within [{min_ms}, {max_ms}] ms (got {value_ms})")]
    TimeoutOutOfRange {
        /// Schema section (e.g. `settings.remote`).
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// A URL entry is invalid or not http/https.
    #[error("invalid URL for {section}.{field}")]
    InvalidUrl {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Invalid URL value.
        url: String,
    },
    /// A field required by the selected backend is missing.
    #[error("{section}.{field} is required")]
    MissingField {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
    },
    /// A field has an unusable value.
    #[error("invalid value for {section}.{field}: {reason}")]
    InvalidValue {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Human readable reason.
        reason: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
            Self::MissingField { .. } => ErrorCode::new("config", "missing_field"),
            Self::InvalidValue { .. } => ErrorCode::new("config", "invalid_value"),
        }
    }
}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                ..
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value_ms", value_ms.to_string()),
            ConfigSchemaError::InvalidUrl {
                section,
                field,
                url,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("url", sanitize_url_for_error(&url)),
            ConfigSchemaError::MissingField { section, field }
            | ConfigSchemaError::InvalidValue { section, field, .. } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
        }
    }
}

fn validate_http_url(
    section: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ConfigSchemaError> {
    let invalid = || ConfigSchemaError::InvalidUrl {
        section,
        field,
        url: value.to_owned(),
    };
    let parsed = Url::parse(value).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }
    Ok(())
}

fn normalize_optional_trimmed(value: &mut Option<Box<str>>) {
    *value = value
        .take()
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
        .map(String::into_boxed_str);
}
