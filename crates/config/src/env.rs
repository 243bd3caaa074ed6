//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but blank or malformed
//! fails fast instead of being ignored. Secret values never appear in error
//! metadata.

use crate::schema::{PropertySourceKind, QuickLinksConfig, SettingsBackend, ValidatedConfig};
use quick_links_shared::{ErrorCode, ErrorEnvelope, REDACTED, SecretString, is_secret_key};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Env var: settings backend (`remote`, `host`, `local`).
pub const ENV_SETTINGS_BACKEND: &str = "QL_SETTINGS_BACKEND";
/// Env var: remote settings base URL.
pub const ENV_SETTINGS_BASE_URL: &str = "QL_SETTINGS_BASE_URL";
/// Env var: remote settings timeout in milliseconds.
pub const ENV_SETTINGS_TIMEOUT_MS: &str = "QL_SETTINGS_TIMEOUT_MS";
/// Env var: remote settings bearer token.
pub const ENV_SETTINGS_API_TOKEN: &str = "QL_SETTINGS_API_TOKEN";
/// Env var: local settings directory.
pub const ENV_SETTINGS_DIR: &str = "QL_SETTINGS_DIR";
/// Env var: JSON file backing the host store.
pub const ENV_HOST_STORE_PATH: &str = "QL_HOST_STORE_PATH";
/// Env var: property source (`static`, `remote`).
pub const ENV_PROPERTIES_SOURCE: &str = "QL_PROPERTIES_SOURCE";
/// Env var: remote property source base URL.
pub const ENV_PROPERTIES_BASE_URL: &str = "QL_PROPERTIES_BASE_URL";
/// Env var: remote property source bearer token.
pub const ENV_PROPERTIES_API_TOKEN: &str = "QL_PROPERTIES_API_TOKEN";
/// Env var: default portal id.
pub const ENV_PORTAL_ID: &str = "QL_PORTAL_ID";

const ALL_ENV_VARS: [&str; 10] = [
    ENV_SETTINGS_BACKEND,
    ENV_SETTINGS_BASE_URL,
    ENV_SETTINGS_TIMEOUT_MS,
    ENV_SETTINGS_API_TOKEN,
    ENV_SETTINGS_DIR,
    ENV_HOST_STORE_PATH,
    ENV_PROPERTIES_SOURCE,
    ENV_PROPERTIES_BASE_URL,
    ENV_PROPERTIES_API_TOKEN,
    ENV_PORTAL_ID,
];

/// Parsed env overrides. Every field is optional; `None` leaves the config as is.
#[derive(Debug, Clone, Default)]
pub struct QuickLinksEnv {
    /// Settings backend override.
    pub settings_backend: Option<SettingsBackend>,
    /// Remote settings base URL override.
    pub settings_base_url: Option<Box<str>>,
    /// Remote settings timeout override.
    pub settings_timeout_ms: Option<u64>,
    /// Remote settings bearer token.
    pub settings_api_token: Option<SecretString>,
    /// Local settings directory override.
    pub settings_dir: Option<Box<str>>,
    /// Host store file override.
    pub host_store_path: Option<Box<str>>,
    /// Property source override.
    pub properties_source: Option<PropertySourceKind>,
    /// Remote property source base URL override.
    pub properties_base_url: Option<Box<str>>,
    /// Remote property source bearer token.
    pub properties_api_token: Option<SecretString>,
    /// Default portal override.
    pub portal_id: Option<Box<str>>,
}

impl QuickLinksEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            settings_backend: parse_optional_enum(map, ENV_SETTINGS_BACKEND, SettingsBackend::parse)?,
            settings_base_url: parse_optional_url_string(map, ENV_SETTINGS_BASE_URL)?,
            settings_timeout_ms: parse_optional_u64(map, ENV_SETTINGS_TIMEOUT_MS)?,
            settings_api_token: parse_optional_secret(map, ENV_SETTINGS_API_TOKEN)?,
            settings_dir: parse_optional_trimmed_string(map, ENV_SETTINGS_DIR)?,
            host_store_path: parse_optional_trimmed_string(map, ENV_HOST_STORE_PATH)?,
            properties_source: parse_optional_enum(
                map,
                ENV_PROPERTIES_SOURCE,
                PropertySourceKind::parse,
            )?,
            properties_base_url: parse_optional_url_string(map, ENV_PROPERTIES_BASE_URL)?,
            properties_api_token: parse_optional_secret(map, ENV_PROPERTIES_API_TOKEN)?,
            portal_id: parse_optional_trimmed_string(map, ENV_PORTAL_ID)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// True when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.settings_backend.is_none()
            && self.settings_base_url.is_none()
            && self.settings_timeout_ms.is_none()
            && self.settings_api_token.is_none()
            && self.settings_dir.is_none()
            && self.host_store_path.is_none()
            && self.properties_source.is_none()
            && self.properties_base_url.is_none()
            && self.properties_api_token.is_none()
            && self.portal_id.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: QuickLinksConfig,
    env: &QuickLinksEnv,
) -> Result<ValidatedConfig, ErrorEnvelope> {
    let mut config = base;
    merge_env(&mut config, env);
    config.validate_and_normalize().map_err(Into::into)
}

fn merge_env(config: &mut QuickLinksConfig, env: &QuickLinksEnv) {
    set_copy(&mut config.settings.backend, env.settings_backend);
    set_box_str(&mut config.settings.remote.base_url, env.settings_base_url.as_deref());
    set_copy(&mut config.settings.remote.timeout_ms, env.settings_timeout_ms);
    set_secret(&mut config.settings.remote.api_token, env.settings_api_token.as_ref());
    if let Some(dir) = env.settings_dir.as_ref() {
        config.settings.local.directory = dir.clone();
    }
    set_box_str(&mut config.settings.host.path, env.host_store_path.as_deref());

    set_copy(&mut config.properties.source, env.properties_source);
    set_box_str(&mut config.properties.remote.base_url, env.properties_base_url.as_deref());
    set_secret(&mut config.properties.remote.api_token, env.properties_api_token.as_ref());

    set_box_str(&mut config.portal_id, env.portal_id.as_deref());
}

fn set_copy<T: Copy>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn set_box_str(field: &mut Option<Box<str>>, value: Option<&str>) {
    if let Some(value) = value {
        *field = Some(value.into());
    }
}

fn set_secret(field: &mut Option<Box<str>>, value: Option<&SecretString>) {
    if let Some(value) = value {
        *field = Some(value.expose().into());
    }
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// A secret env var was present but empty after trimming.
    EmptySecret {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } | Self::EmptySecret { .. } => {
                ErrorCode::new("config", "empty_env_var")
            },
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } | Self::EmptySecret { var } => {
                write!(formatter, "{var} must be non-empty")
            },
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid URL"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            EnvParseError::EmptyValue { var } | EnvParseError::EmptySecret { var } => {
                envelope.with_metadata("env_var", var)
            },
            EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidUrl { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_value(var, &value)),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptySecret { var });
    }

    Ok(Some(SecretString::new(trimmed.to_owned())))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed.into_string(),
        })
}

fn parse_optional_enum<T>(
    map: &BTreeMap<String, String>,
    var: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    parse(&trimmed)
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidEnum {
            var,
            value: trimmed.into_string(),
        })
}

fn parse_optional_url_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    let invalid = || EnvParseError::InvalidUrl {
        var,
        value: trimmed.to_string(),
    };
    let parsed = Url::parse(&trimmed).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }

    Ok(Some(trimmed))
}

fn redact_value(var: &str, value: &str) -> String {
    if is_secret_key(var) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}
