//! Domain primitives with validated constructors.

use quick_links_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `PortalId` is empty after trimming.
    InvalidPortalId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `ObjectType` is empty after trimming.
    InvalidObjectType {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `RecordId` is empty after trimming.
    InvalidRecordId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `PropertyName` is empty after trimming.
    InvalidPropertyName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// Property names may not contain whitespace or separators.
    PropertyNameCharacters {
        /// Trimmed name that failed validation.
        input: String,
    },
    /// Scope key is not one of the known partitions.
    UnknownScope {
        /// Raw scope value.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidPortalId { .. } => ErrorCode::new("domain", "invalid_portal_id"),
            Self::InvalidObjectType { .. } => ErrorCode::new("domain", "invalid_object_type"),
            Self::InvalidRecordId { .. } => ErrorCode::new("domain", "invalid_record_id"),
            Self::InvalidPropertyName { .. } | Self::PropertyNameCharacters { .. } => {
                ErrorCode::new("domain", "invalid_property_name")
            },
            Self::UnknownScope { .. } => ErrorCode::new("domain", "unknown_scope"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPortalId { .. } => formatter.write_str("PortalId must be non-empty"),
            Self::InvalidObjectType { .. } => formatter.write_str("ObjectType must be non-empty"),
            Self::InvalidRecordId { .. } => formatter.write_str("RecordId must be non-empty"),
            Self::InvalidPropertyName { .. } => {
                formatter.write_str("PropertyName must be non-empty")
            },
            Self::PropertyNameCharacters { .. } => {
                formatter.write_str("PropertyName may not contain whitespace, ',' or '/'")
            },
            Self::UnknownScope { .. } => {
                formatter.write_str("scope must be one of contact, company, legacy-shared")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::InvalidPortalId { input_length }
            | PrimitiveError::InvalidObjectType { input_length }
            | PrimitiveError::InvalidRecordId { input_length }
            | PrimitiveError::InvalidPropertyName { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::PropertyNameCharacters { input }
            | PrimitiveError::UnknownScope { input } => envelope.with_metadata("input", input),
        }
    }
}

fn trimmed_non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Tenant identity; the key under which settings are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortalId(Box<str>);

impl PortalId {
    /// Parse a `PortalId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::InvalidPortalId {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PortalId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// CRM object type of the record being viewed (`CONTACT`, `0-2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectType(Box<str>);

impl ObjectType {
    /// Parse a `ObjectType` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::InvalidObjectType {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ObjectType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// CRM record identifier, used by remote property sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Box<str>);

impl RecordId {
    /// Parse a `RecordId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::InvalidRecordId {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Name of a CRM record property requested from the property source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyName(Box<str>);

impl PropertyName {
    /// Parse a property name; rejects blanks and characters that would break
    /// comma-separated fetch requests.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::InvalidPropertyName {
                input_length: raw.len(),
            });
        };
        if trimmed
            .chars()
            .any(|ch| ch.is_whitespace() || ch == ',' || ch == '/')
        {
            return Err(PrimitiveError::PropertyNameCharacters {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PropertyName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
