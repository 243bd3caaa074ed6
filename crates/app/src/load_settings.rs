//! Load the stored settings document and migrate it to canonical form.
//!
//! Loading never fails. A backend failure is a soft warning and the caller
//! continues with the built-in defaults.

use crate::log_fields;
use quick_links_domain::{
    CanonicalSettings, DocumentShape, MigrationNote, PortalId, migrate_loaded,
};
use quick_links_ports::{LogFields, LoggerPort, SettingsStorePort};
use quick_links_shared::{ErrorEnvelope, RequestContext};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Warning shown when the store could not be read.
pub const USING_DEFAULTS_WARNING: &str = "Unable to load settings; using defaults";

/// Dependencies required by load-settings.
#[derive(Clone)]
pub struct LoadSettingsDeps {
    /// Settings persistence backend.
    pub store: Arc<dyn SettingsStorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Canonical settings plus what happened while obtaining them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    /// Settings ready for resolution or editing.
    pub settings: CanonicalSettings,
    /// Layout the stored document was recognised as.
    pub shape: DocumentShape,
    /// Repairs applied during migration.
    pub notes: Vec<MigrationNote>,
    /// Backend failure that forced the defaults, if any.
    pub load_error: Option<ErrorEnvelope>,
}

impl LoadedSettings {
    /// True when the built-in defaults are in use because nothing usable was stored.
    #[must_use]
    pub fn used_defaults(&self) -> bool {
        self.load_error.is_some() || self.shape == DocumentShape::Unrecognized
    }

    /// User-facing warning for a failed load.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        self.load_error
            .as_ref()
            .map(|error| format!("{USING_DEFAULTS_WARNING}: {}", error.reason_or("unknown error")))
    }

    /// Summary suitable for JSON output.
    #[must_use]
    pub fn report(&self) -> LoadReport {
        LoadReport {
            shape: self.shape,
            notes: self.notes.iter().map(ToString::to_string).collect(),
            warning: self.warning(),
        }
    }
}

/// Serializable digest of a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Recognised layout.
    pub shape: DocumentShape,
    /// Migration notes, rendered as text.
    pub notes: Vec<String>,
    /// Load warning, if the store failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Load and migrate the settings stored for `portal_id`.
#[tracing::instrument(name = "quicklinks.load_settings", skip_all, fields(portal_id = %portal_id))]
pub async fn load_settings(
    ctx: &RequestContext,
    deps: &LoadSettingsDeps,
    portal_id: &PortalId,
) -> LoadedSettings {
    let started_at = Instant::now();
    let backend = deps.store.backend_name();

    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "quicklinks.loadSettings.start",
            "Load settings started",
            Some(log_fields_start(portal_id, backend)),
        );
    }

    let (raw, load_error) = match deps.store.load(ctx, portal_id).await {
        Ok(raw) => (raw, None),
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.warn(
                    "quicklinks.loadSettings.fallback",
                    USING_DEFAULTS_WARNING,
                    Some(log_fields::with_error(
                        log_fields_start(portal_id, backend),
                        &error,
                    )),
                );
            }
            (None, Some(error))
        },
    };

    let migration = migrate_loaded(raw.as_ref());

    if let Some(logger) = deps.logger.as_ref() {
        for note in &migration.notes {
            log_note(logger.as_ref(), portal_id, note);
        }
        logger.info(
            "quicklinks.loadSettings.completed",
            "Load settings completed",
            Some(log_fields_completed(
                portal_id,
                backend,
                migration.shape,
                migration.notes.len(),
                started_at,
            )),
        );
    }

    LoadedSettings {
        settings: migration.settings,
        shape: migration.shape,
        notes: migration.notes,
        load_error,
    }
}

/// Benign notes go to debug; anything that dropped or rewrote stored data is a warning.
fn log_note(logger: &dyn LoggerPort, portal_id: &PortalId, note: &MigrationNote) {
    let mut fields = log_fields::portal(portal_id.as_str());
    let note_value = serde_json::to_value(note).unwrap_or(Value::Null);
    log_fields::insert(&mut fields, "note", note_value);

    let message = note.to_string();
    match note {
        MigrationNote::NoDocument | MigrationNote::DecodedFromString => {
            logger.debug("quicklinks.loadSettings.migration", &message, Some(fields));
        },
        _ => logger.warn("quicklinks.loadSettings.migration", &message, Some(fields)),
    }
}

fn log_fields_start(portal_id: &PortalId, backend: &str) -> LogFields {
    let mut fields = log_fields::portal(portal_id.as_str());
    log_fields::insert(&mut fields, "backend", backend);
    fields
}

fn log_fields_completed(
    portal_id: &PortalId,
    backend: &str,
    shape: DocumentShape,
    note_count: usize,
    started_at: Instant,
) -> LogFields {
    let mut fields = log_fields_start(portal_id, backend);
    log_fields::insert(
        &mut fields,
        "shape",
        serde_json::to_value(shape).unwrap_or(Value::Null),
    );
    log_fields::insert(&mut fields, "noteCount", note_count);
    log_fields::with_duration(fields, started_at)
}
