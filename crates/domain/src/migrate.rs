//! Persisted settings migration.
//!
//! Stored documents accumulate across every schema the application has
//! shipped. Migration detects which layout a raw value matches and rebuilds it
//! as [`CanonicalSettings`]. It never fails: anything unrecognised becomes the
//! built-in default, and the reasons are returned as [`MigrationNote`]s for
//! diagnostics.
//!
//! Layout detection is an ordered table of detectors; the first match wins.
//! Supporting another historical layout means adding one detector and one
//! [`PersistedShape`] variant.

use crate::descriptor::{ButtonDescriptor, LabelType, MAX_BUTTONS_PER_SCOPE, default_label};
use crate::extract::extract_property_value;
use crate::scope::ScopeKey;
use crate::settings::CanonicalSettings;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Layout a raw document was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    /// `{ "contactButtons": [...], "companyButtons": [...] }`.
    Scoped,
    /// `{ "buttons": [...] }`, one list for every record type.
    LegacySingleArray,
    /// Missing, not an object, or no recognised keys.
    Unrecognized,
}

/// Diagnostic produced while migrating; never surfaced to end users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationNote {
    /// Nothing stored yet, or the store returned `null`.
    NoDocument,
    /// The document matched no known layout.
    UnrecognizedDocument {
        /// JSON type of the top-level value.
        found: &'static str,
    },
    /// The document was a JSON object encoded inside a string.
    DecodedFromString,
    /// A scope key was present but not an array.
    ScopeNotArray {
        /// Scope the key belongs to.
        scope: ScopeKey,
        /// JSON type that was found instead.
        found: &'static str,
    },
    /// An entry was not an object and was skipped.
    EntryNotObject {
        /// Scope of the list.
        scope: ScopeKey,
        /// Position in the stored list.
        index: usize,
    },
    /// An entry had no `labelType`; it was treated as static.
    MissingLabelType {
        /// Scope of the list.
        scope: ScopeKey,
        /// Position in the stored list.
        index: usize,
    },
    /// An entry had an unknown `labelType`; it was treated as static.
    UnknownLabelType {
        /// Scope of the list.
        scope: ScopeKey,
        /// Position in the stored list.
        index: usize,
        /// Value that was found.
        value: String,
    },
    /// An entry had no usable `staticLabel`; `Link N` was substituted.
    MissingStaticLabel {
        /// Scope of the list.
        scope: ScopeKey,
        /// Position in the stored list.
        index: usize,
    },
    /// A list was longer than the per-scope maximum and was cut.
    Truncated {
        /// Scope of the list.
        scope: ScopeKey,
        /// Entries dropped from the end.
        dropped: usize,
    },
}

impl fmt::Display for MigrationNote {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => formatter.write_str("no stored settings; using defaults"),
            Self::UnrecognizedDocument { found } => {
                write!(formatter, "unrecognized settings document ({found}); using defaults")
            },
            Self::DecodedFromString => formatter.write_str("settings document was JSON-encoded"),
            Self::ScopeNotArray { scope, found } => {
                write!(formatter, "{} is {found}, expected array", scope.document_key())
            },
            Self::EntryNotObject { scope, index } => {
                write!(formatter, "{scope}[{index}] is not an object; skipped")
            },
            Self::MissingLabelType { scope, index } => {
                write!(formatter, "{scope}[{index}] has no labelType; using static")
            },
            Self::UnknownLabelType {
                scope,
                index,
                value,
            } => write!(
                formatter,
                "{scope}[{index}] has unknown labelType {value:?}; using static"
            ),
            Self::MissingStaticLabel { scope, index } => {
                write!(formatter, "{scope}[{index}] has no staticLabel; using default")
            },
            Self::Truncated { scope, dropped } => write!(
                formatter,
                "{scope} exceeds {MAX_BUTTONS_PER_SCOPE} buttons; dropped {dropped}"
            ),
        }
    }
}

/// Result of migrating one raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Canonical settings, always structurally valid.
    pub settings: CanonicalSettings,
    /// Layout that was recognised.
    pub shape: DocumentShape,
    /// Everything that was repaired or ignored along the way.
    pub notes: Vec<MigrationNote>,
}

/// Migrate a raw persisted document into canonical settings.
#[must_use]
pub fn migrate(raw: &Value) -> CanonicalSettings {
    migrate_with_report(raw).settings
}

/// Migrate a raw persisted document, keeping the diagnostics.
#[must_use]
pub fn migrate_with_report(raw: &Value) -> Migration {
    let mut notes = Vec::new();
    let (settings, shape) = migrate_value(raw, true, &mut notes);
    Migration {
        settings,
        shape,
        notes,
    }
}

/// Migrate the outcome of a store load, where `None` means nothing was stored.
#[must_use]
pub fn migrate_loaded(raw: Option<&Value>) -> Migration {
    raw.map_or_else(
        || Migration {
            settings: CanonicalSettings::defaults(),
            shape: DocumentShape::Unrecognized,
            notes: vec![MigrationNote::NoDocument],
        },
        migrate_with_report,
    )
}

/// A raw document matched against one historical layout.
#[derive(Debug)]
enum PersistedShape<'a> {
    Scoped {
        contact: Option<&'a Value>,
        company: Option<&'a Value>,
    },
    LegacySingleArray(&'a [Value]),
    EncodedJson(Value),
}

type Detector = for<'a> fn(&'a Value) -> Option<PersistedShape<'a>>;

const DETECTORS: [Detector; 3] = [detect_scoped, detect_legacy_single_array, detect_encoded_json];

fn migrate_value(
    raw: &Value,
    allow_encoded: bool,
    notes: &mut Vec<MigrationNote>,
) -> (CanonicalSettings, DocumentShape) {
    let detected = DETECTORS.iter().find_map(|detect| detect(raw));

    match detected {
        Some(PersistedShape::Scoped { contact, company }) => {
            let settings = CanonicalSettings::default()
                .with_buttons(ScopeKey::Contact, scoped_list(contact, ScopeKey::Contact, notes))
                .with_buttons(ScopeKey::Company, scoped_list(company, ScopeKey::Company, notes));
            (settings, DocumentShape::Scoped)
        },
        Some(PersistedShape::LegacySingleArray(entries)) => {
            let shared = descriptors_from_entries(entries, ScopeKey::LegacyShared, notes);
            let settings = CanonicalSettings::default()
                .with_buttons(ScopeKey::Contact, shared.clone())
                .with_buttons(ScopeKey::Company, shared.clone())
                .with_buttons(ScopeKey::LegacyShared, shared);
            (settings, DocumentShape::LegacySingleArray)
        },
        Some(PersistedShape::EncodedJson(decoded)) if allow_encoded => {
            notes.push(MigrationNote::DecodedFromString);
            migrate_value(&decoded, false, notes)
        },
        Some(PersistedShape::EncodedJson(_)) | None => {
            notes.push(if raw.is_null() {
                MigrationNote::NoDocument
            } else {
                MigrationNote::UnrecognizedDocument {
                    found: json_type(raw),
                }
            });
            (CanonicalSettings::defaults(), DocumentShape::Unrecognized)
        },
    }
}

fn detect_scoped(raw: &Value) -> Option<PersistedShape<'_>> {
    let fields = raw.as_object()?;
    let contact = fields.get(ScopeKey::Contact.document_key());
    let company = fields.get(ScopeKey::Company.document_key());
    let has_array = [contact, company].into_iter().flatten().any(Value::is_array);
    has_array.then_some(PersistedShape::Scoped { contact, company })
}

fn detect_legacy_single_array(raw: &Value) -> Option<PersistedShape<'_>> {
    raw.as_object()?
        .get(ScopeKey::LegacyShared.document_key())?
        .as_array()
        .map(|entries| PersistedShape::LegacySingleArray(entries.as_slice()))
}

fn detect_encoded_json(raw: &Value) -> Option<PersistedShape<'_>> {
    let decoded: Value = serde_json::from_str(raw.as_str()?).ok()?;
    decoded.is_object().then_some(PersistedShape::EncodedJson(decoded))
}

fn scoped_list(
    value: Option<&Value>,
    scope: ScopeKey,
    notes: &mut Vec<MigrationNote>,
) -> Vec<ButtonDescriptor> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => descriptors_from_entries(entries, scope, notes),
        Some(other) => {
            notes.push(MigrationNote::ScopeNotArray {
                scope,
                found: json_type(other),
            });
            Vec::new()
        },
    }
}

fn descriptors_from_entries(
    entries: &[Value],
    scope: ScopeKey,
    notes: &mut Vec<MigrationNote>,
) -> Vec<ButtonDescriptor> {
    let mut descriptors = Vec::with_capacity(entries.len().min(MAX_BUTTONS_PER_SCOPE));
    for (index, entry) in entries.iter().enumerate() {
        let Some(fields) = entry.as_object() else {
            notes.push(MigrationNote::EntryNotObject { scope, index });
            continue;
        };
        let position = descriptors.len() + 1;
        descriptors.push(descriptor_from_fields(fields, scope, index, position, notes));
    }

    if descriptors.len() > MAX_BUTTONS_PER_SCOPE {
        notes.push(MigrationNote::Truncated {
            scope,
            dropped: descriptors.len() - MAX_BUTTONS_PER_SCOPE,
        });
        descriptors.truncate(MAX_BUTTONS_PER_SCOPE);
    }
    descriptors
}

fn descriptor_from_fields(
    fields: &Map<String, Value>,
    scope: ScopeKey,
    index: usize,
    position: usize,
    notes: &mut Vec<MigrationNote>,
) -> ButtonDescriptor {
    let label_type = match fields.get("labelType") {
        Some(Value::String(value)) if value == LabelType::Property.as_str() => LabelType::Property,
        Some(Value::String(value)) if value == LabelType::Static.as_str() => LabelType::Static,
        None | Some(Value::Null) => {
            notes.push(MigrationNote::MissingLabelType { scope, index });
            LabelType::Static
        },
        Some(other) => {
            notes.push(MigrationNote::UnknownLabelType {
                scope,
                index,
                value: extract_property_value(other),
            });
            LabelType::Static
        },
    };

    let label_property = match label_type {
        LabelType::Property => Some(text_field(fields, "labelProperty").unwrap_or_default()),
        LabelType::Static => None,
    };

    let static_label = text_field(fields, "staticLabel")
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| {
            notes.push(MigrationNote::MissingStaticLabel { scope, index });
            default_label(position)
        });

    ButtonDescriptor {
        url_property: text_field(fields, "urlProperty").unwrap_or_default(),
        label_type,
        label_property,
        static_label,
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .filter(|value| !value.is_null())
        .map(extract_property_value)
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
