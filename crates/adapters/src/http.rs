//! Shared plumbing for the HTTP-backed adapters.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use quick_links_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Connection settings for one HTTP service.
#[derive(Debug, Clone)]
pub struct HttpEndpointConfig {
    /// Base URL; a trailing slash is ignored.
    pub base_url: Box<str>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Optional bearer token.
    pub api_token: Option<SecretString>,
}

/// A configured client bound to one base URL.
#[derive(Debug, Clone)]
pub(crate) struct HttpService {
    client: reqwest::Client,
    base_url: Box<str>,
    name: &'static str,
}

impl HttpService {
    pub(crate) fn new(config: &HttpEndpointConfig, name: &'static str) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("{name} base url must be non-empty"),
            ));
        }
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = config.api_token.as_ref() {
            let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
                .map_err(|_| {
                    ErrorEnvelope::expected(
                        ErrorCode::invalid_input(),
                        "api token contains invalid header characters",
                    )
                })?;
            auth_header.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("adapter", "http_client_init_failed"),
                    format!("failed to build {name} client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            name,
        })
    }

    pub(crate) const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("invalid {} base url: {error}", self.name),
            )
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    format!("{} base url cannot carry a path", self.name),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn map_reqwest_error(&self, error: &reqwest::Error) -> ErrorEnvelope {
        let name = self.name;
        if error.is_timeout() {
            return ErrorEnvelope::unexpected(
                ErrorCode::timeout(),
                format!("{name} request timed out"),
                ErrorClass::Retriable,
            );
        }
        if error.is_connect() {
            return ErrorEnvelope::unexpected(
                ErrorCode::io(),
                format!("{name} connection failed: {error}"),
                ErrorClass::Retriable,
            );
        }
        ErrorEnvelope::unexpected(
            ErrorCode::new("adapter", "http_request_failed"),
            format!("{name} request failed: {error}"),
            ErrorClass::NonRetriable,
        )
    }

    pub(crate) fn map_http_error(&self, status: StatusCode, payload: &[u8]) -> ErrorEnvelope {
        let message = serde_json::from_slice::<ServiceErrorBody>(payload)
            .ok()
            .and_then(ServiceErrorBody::into_message)
            .unwrap_or_else(|| format!("{} request failed with status {status}", self.name));

        let envelope = match status.as_u16() {
            400 | 422 => ErrorEnvelope::expected(ErrorCode::invalid_input(), message),
            401 | 403 => ErrorEnvelope::expected(ErrorCode::permission_denied(), message),
            404 => ErrorEnvelope::expected(ErrorCode::not_found(), message),
            408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
            429 => ErrorEnvelope::unexpected(
                ErrorCode::rate_limited(),
                message,
                ErrorClass::Retriable,
            ),
            _ if status.is_server_error() => ErrorEnvelope::unexpected(
                ErrorCode::dependency_unavailable(),
                message,
                ErrorClass::Retriable,
            ),
            _ => ErrorEnvelope::unexpected(
                ErrorCode::new("adapter", "http_error"),
                message,
                ErrorClass::NonRetriable,
            ),
        };

        envelope
            .with_metadata("service", self.name)
            .with_metadata("status", status.as_u16().to_string())
    }

    pub(crate) fn invalid_response(&self, error: &serde_json::Error) -> ErrorEnvelope {
        ErrorEnvelope::unexpected(
            ErrorCode::new("adapter", "invalid_response"),
            format!("failed to decode {} response: {error}", self.name),
            ErrorClass::NonRetriable,
        )
    }
}

/// Error bodies seen from settings and CRM services: `{ "message" }` or
/// `{ "error": "..." }` / `{ "error": { "message" } }`.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
    error: Option<serde_json::Value>,
}

impl ServiceErrorBody {
    fn into_message(self) -> Option<String> {
        let nested = self.error.and_then(|error| match error {
            serde_json::Value::String(text) => Some(text),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
            _ => None,
        });
        self.message
            .or(nested)
            .map(|message| message.trim().to_owned())
            .filter(|message| !message.is_empty())
    }
}
