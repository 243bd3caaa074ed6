//! # quick-links-shared
//!
//! Foundational types used by every quick-links crate:
//!
//! - `Result` and the structured `ErrorEnvelope`
//! - Secret redaction helpers
//! - `RequestContext` for log correlation
//!
//! This crate has no workspace dependencies.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod context;
pub mod errors;
pub mod redaction;
pub mod result;

pub use context::{CorrelationId, RequestContext};
pub use errors::{
    DEFAULT_SAVE_FAILURE_REASON, ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata,
    UnexpectedError, normalize_unexpected_error,
};
pub use redaction::{REDACTED, SecretString, is_secret_key, redact_if_secret};
pub use result::{Result, ResultExt};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
