//! Record-type partitions for button lists.

use crate::primitives::{ObjectType, PrimitiveError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Partition a descriptor list applies to.
///
/// `LegacyShared` only appears as a migration artifact: one list that applied
/// to every object type before lists were split per record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKey {
    /// Contact records.
    Contact,
    /// Company records.
    Company,
    /// Pre-partition list shared by all record types.
    LegacyShared,
}

impl ScopeKey {
    /// Scopes the editor can address directly.
    pub const EDITABLE: [Self; 2] = [Self::Contact, Self::Company];

    /// Stable string form used in logs and CLI flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Company => "company",
            Self::LegacyShared => "legacy-shared",
        }
    }

    /// Key of this scope in the persisted document.
    #[must_use]
    pub const fn document_key(self) -> &'static str {
        match self {
            Self::Contact => "contactButtons",
            Self::Company => "companyButtons",
            Self::LegacyShared => "buttons",
        }
    }

    /// Map a CRM object type onto its dedicated scope.
    ///
    /// Accepts the host's uppercase names, plural API names, and numeric
    /// object type ids. Returns `None` for record types without a dedicated
    /// list (deals, tickets, custom objects).
    #[must_use]
    pub fn for_object_type(object_type: &ObjectType) -> Option<Self> {
        match object_type.as_str().to_ascii_lowercase().as_str() {
            "contact" | "contacts" | "0-1" => Some(Self::Contact),
            "company" | "companies" | "0-2" => Some(Self::Company),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ScopeKey {
    type Err = PrimitiveError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "contact" => Ok(Self::Contact),
            "company" => Ok(Self::Company),
            "legacy-shared" | "legacy" | "shared" => Ok(Self::LegacyShared),
            _ => Err(PrimitiveError::UnknownScope {
                input: input.to_owned(),
            }),
        }
    }
}
