//! In-memory editing of the canonical settings document.
//!
//! The editor owns one `CanonicalSettings` value. Every operation replaces a
//! whole scope list; nothing is persisted until [`ConfigurationEditor::save`].

use crate::load_settings::LoadedSettings;
use crate::log_fields;
use quick_links_domain::{
    ButtonDescriptor, CanonicalSettings, LabelType, MAX_BUTTONS_PER_SCOPE, PortalId, ScopeKey,
    default_label,
};
use quick_links_ports::{LoggerPort, SettingsStorePort};
use quick_links_shared::{DEFAULT_SAVE_FAILURE_REASON, ErrorCode, ErrorEnvelope, RequestContext};
use std::sync::Arc;
use std::time::Instant;

/// Rejected editor operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// The scope already holds the maximum number of buttons.
    #[error("{scope} already has the maximum of {MAX_BUTTONS_PER_SCOPE} buttons")]
    MaxButtonsReached {
        /// Scope being edited.
        scope: ScopeKey,
    },
    /// Removing would leave the scope without buttons.
    #[error("{scope} must keep at least one button")]
    LastButton {
        /// Scope being edited.
        scope: ScopeKey,
    },
    /// No button at the requested position.
    #[error("{scope} has no button at index {index} (it has {len})")]
    IndexOutOfRange {
        /// Scope being edited.
        scope: ScopeKey,
        /// Requested position (0-based).
        index: usize,
        /// Current list length.
        len: usize,
    },
    /// Only contact and company lists are editable.
    #[error("{scope} is read-only")]
    ScopeNotEditable {
        /// Scope that was addressed.
        scope: ScopeKey,
    },
}

impl EditorError {
    const fn code(&self) -> &'static str {
        match self {
            Self::MaxButtonsReached { .. } => "max_buttons_reached",
            Self::LastButton { .. } => "last_button",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::ScopeNotEditable { .. } => "scope_not_editable",
        }
    }

    const fn scope(&self) -> ScopeKey {
        match self {
            Self::MaxButtonsReached { scope }
            | Self::LastButton { scope }
            | Self::IndexOutOfRange { scope, .. }
            | Self::ScopeNotEditable { scope } => *scope,
        }
    }
}

impl From<EditorError> for ErrorEnvelope {
    fn from(error: EditorError) -> Self {
        let envelope = Self::expected(ErrorCode::new("editor", error.code()), error.to_string())
            .with_metadata("scope", error.scope().as_str());
        match error {
            EditorError::IndexOutOfRange { index, .. } => {
                envelope.with_metadata("index", index.to_string())
            },
            _ => envelope,
        }
    }
}

/// Failed save; the edits are still held by the editor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct SaveFailure {
    /// Reason to show the user.
    pub reason: String,
    /// Backend error.
    #[source]
    pub error: ErrorEnvelope,
}

impl From<SaveFailure> for ErrorEnvelope {
    fn from(failure: SaveFailure) -> Self {
        failure.error
    }
}

/// Partial update for one button. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonPatch {
    /// New URL property.
    pub url_property: Option<String>,
    /// New label source.
    pub label_type: Option<LabelType>,
    /// New label property; ignored while the label is static.
    pub label_property: Option<String>,
    /// New static label.
    pub static_label: Option<String>,
}

impl ButtonPatch {
    /// True when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.url_property.is_none()
            && self.label_type.is_none()
            && self.label_property.is_none()
            && self.static_label.is_none()
    }

    fn apply(self, descriptor: &mut ButtonDescriptor) {
        if let Some(url_property) = self.url_property {
            descriptor.url_property = url_property;
        }
        if let Some(static_label) = self.static_label {
            descriptor.static_label = static_label;
        }
        if let Some(label_type) = self.label_type {
            descriptor.label_type = label_type;
        }
        match descriptor.label_type {
            LabelType::Static => descriptor.label_property = None,
            LabelType::Property => {
                if let Some(label_property) = self.label_property {
                    descriptor.label_property = Some(label_property);
                }
                // Switching to property labels starts from a blank name.
                descriptor.label_property.get_or_insert_with(String::new);
            },
        }
    }
}

/// Editing session over one portal's settings.
pub struct ConfigurationEditor {
    portal_id: PortalId,
    settings: CanonicalSettings,
    dirty: bool,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl ConfigurationEditor {
    /// Start editing `settings` for `portal_id`.
    #[must_use]
    pub const fn new(portal_id: PortalId, settings: CanonicalSettings) -> Self {
        Self {
            portal_id,
            settings,
            dirty: false,
            logger: None,
        }
    }

    /// Start editing the outcome of a load.
    #[must_use]
    pub fn from_loaded(portal_id: PortalId, loaded: &LoadedSettings) -> Self {
        Self::new(portal_id, loaded.settings.clone())
    }

    /// Attach a logger for save events.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Portal being edited.
    #[must_use]
    pub const fn portal_id(&self) -> &PortalId {
        &self.portal_id
    }

    /// Current in-memory settings.
    #[must_use]
    pub const fn settings(&self) -> &CanonicalSettings {
        &self.settings
    }

    /// Buttons of `scope`; empty when the scope has no list.
    #[must_use]
    pub fn buttons(&self, scope: ScopeKey) -> &[ButtonDescriptor] {
        self.settings.buttons(scope).unwrap_or_default()
    }

    /// True when there are unsaved edits.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append an unconfigured `Link N+1` button. Returns its index.
    pub fn add_button(&mut self, scope: ScopeKey) -> Result<usize, EditorError> {
        let mut buttons = self.editable(scope)?;
        if buttons.len() >= MAX_BUTTONS_PER_SCOPE {
            return Err(EditorError::MaxButtonsReached { scope });
        }
        let index = buttons.len();
        buttons.push(ButtonDescriptor::placeholder(default_label(index + 1)));
        self.replace(scope, buttons);
        Ok(index)
    }

    /// Remove the button at `index`. The last remaining button cannot be removed.
    pub fn remove_button(
        &mut self,
        scope: ScopeKey,
        index: usize,
    ) -> Result<ButtonDescriptor, EditorError> {
        let mut buttons = self.editable(scope)?;
        let len = buttons.len();
        if index >= len {
            return Err(EditorError::IndexOutOfRange { scope, index, len });
        }
        if len <= 1 {
            return Err(EditorError::LastButton { scope });
        }
        let removed = buttons.remove(index);
        self.replace(scope, buttons);
        Ok(removed)
    }

    /// Merge `patch` into the button at `index`.
    pub fn update_button(
        &mut self,
        scope: ScopeKey,
        index: usize,
        patch: ButtonPatch,
    ) -> Result<&ButtonDescriptor, EditorError> {
        let mut buttons = self.editable(scope)?;
        let len = buttons.len();
        let descriptor = buttons
            .get_mut(index)
            .ok_or(EditorError::IndexOutOfRange { scope, index, len })?;
        patch.apply(descriptor);
        self.replace(scope, buttons);
        self.buttons(scope)
            .get(index)
            .ok_or(EditorError::IndexOutOfRange { scope, index, len })
    }

    /// Discard all edits and return to the built-in defaults (unsaved).
    pub fn reset(&mut self) {
        self.settings = CanonicalSettings::defaults();
        self.dirty = true;
    }

    /// Persist the whole document.
    ///
    /// On success the editor holds exactly what was written. On failure the
    /// edits are kept and the editor stays dirty so the save can be retried.
    pub async fn save(
        &mut self,
        ctx: &RequestContext,
        store: &dyn SettingsStorePort,
    ) -> Result<(), SaveFailure> {
        let started_at = Instant::now();
        let document = self.settings.to_document();
        let mut fields = log_fields::portal(self.portal_id.as_str());
        log_fields::insert(&mut fields, "backend", store.backend_name());

        match store.save(ctx, &self.portal_id, document.clone()).await {
            Ok(()) => {
                self.settings = CanonicalSettings::from(document);
                self.dirty = false;
                if let Some(logger) = self.logger.as_ref() {
                    logger.info(
                        "quicklinks.saveSettings.completed",
                        "Settings saved",
                        Some(log_fields::with_duration(fields, started_at)),
                    );
                }
                Ok(())
            },
            Err(error) => {
                if let Some(logger) = self.logger.as_ref() {
                    logger.error(
                        "quicklinks.saveSettings.failed",
                        "Settings save failed",
                        Some(log_fields::with_error(
                            log_fields::with_duration(fields, started_at),
                            &error,
                        )),
                    );
                }
                Err(SaveFailure {
                    reason: error.reason_or(DEFAULT_SAVE_FAILURE_REASON).to_owned(),
                    error,
                })
            },
        }
    }

    fn editable(&self, scope: ScopeKey) -> Result<Vec<ButtonDescriptor>, EditorError> {
        if !ScopeKey::EDITABLE.contains(&scope) {
            return Err(EditorError::ScopeNotEditable { scope });
        }
        Ok(self.buttons(scope).to_vec())
    }

    fn replace(&mut self, scope: ScopeKey, buttons: Vec<ButtonDescriptor>) {
        self.settings.set_buttons(scope, buttons);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_links_domain::default_descriptors;

    fn editor() -> Result<ConfigurationEditor, ErrorEnvelope> {
        let portal = PortalId::parse("42").map_err(ErrorEnvelope::from)?;
        Ok(ConfigurationEditor::new(portal, CanonicalSettings::defaults()))
    }

    #[test]
    fn add_appends_numbered_placeholder() -> Result<(), ErrorEnvelope> {
        let mut editor = editor()?;
        let index = editor.add_button(ScopeKey::Contact)?;

        assert_eq!(index, 3);
        assert_eq!(
            editor.buttons(ScopeKey::Contact).get(3),
            Some(&ButtonDescriptor::placeholder("Link 4"))
        );
        assert_eq!(editor.buttons(ScopeKey::Company), default_descriptors().as_slice());
        assert!(editor.is_dirty());
        Ok(())
    }

    #[test]
    fn add_stops_at_maximum() -> Result<(), ErrorEnvelope> {
        let mut editor = editor()?;
        while editor.buttons(ScopeKey::Company).len() < MAX_BUTTONS_PER_SCOPE {
            editor.add_button(ScopeKey::Company)?;
        }

        let error = editor.add_button(ScopeKey::Company).err();
        assert_eq!(
            error,
            Some(EditorError::MaxButtonsReached {
                scope: ScopeKey::Company
            })
        );
        assert_eq!(editor.buttons(ScopeKey::Company).len(), MAX_BUTTONS_PER_SCOPE);
        Ok(())
    }

    #[test]
    fn last_button_cannot_be_removed() -> Result<(), ErrorEnvelope> {
        let mut editor = editor()?;
        editor.remove_button(ScopeKey::Contact, 2)?;
        editor.remove_button(ScopeKey::Contact, 0)?;

        assert_eq!(
            editor.buttons(ScopeKey::Contact),
            [ButtonDescriptor::placeholder("Link 2")].as_slice()
        );
        let error = ErrorEnvelope::from(
            editor
                .remove_button(ScopeKey::Contact, 0)
                .err()
                .ok_or_else(|| ErrorEnvelope::expected(ErrorCode::internal(), "expected error"))?,
        );
        assert_eq!(error.code, ErrorCode::new("editor", "last_button"));
        Ok(())
    }

    #[test]
    fn out_of_range_index_is_rejected() -> Result<(), ErrorEnvelope> {
        let mut editor = editor()?;
        let error = editor.remove_button(ScopeKey::Contact, 7).err();
        assert_eq!(
            error,
            Some(EditorError::IndexOutOfRange {
                scope: ScopeKey::Contact,
                index: 7,
                len: 3
            })
        );
        assert!(!editor.is_dirty());
        Ok(())
    }

    #[test]
    fn patch_switches_label_source() -> Result<(), ErrorEnvelope> {
        let mut editor = editor()?;
        let updated = editor.update_button(
            ScopeKey::Contact,
            0,
            ButtonPatch {
                url_property: Some("website".to_owned()),
                label_type: Some(LabelType::Property),
                ..ButtonPatch::default()
            },
        )?;
        assert_eq!(updated.label_property.as_deref(), Some(""));
        assert_eq!(updated.static_label, "Link 1");

        editor.update_button(
            ScopeKey::Contact,
            0,
            ButtonPatch {
                label_property: Some("site_name".to_owned()),
                ..ButtonPatch::default()
            },
        )?;
        let updated = editor.update_button(
            ScopeKey::Contact,
            0,
            ButtonPatch {
                label_type: Some(LabelType::Static),
                ..ButtonPatch::default()
            },
        )?;
        assert_eq!(updated, &ButtonDescriptor::with_static_label("website", "Link 1"));
        Ok(())
    }

    #[test]
    fn legacy_scope_is_read_only() -> Result<(), ErrorEnvelope> {
        let mut editor = editor()?;
        let error = ErrorEnvelope::from(
            editor
                .add_button(ScopeKey::LegacyShared)
                .err()
                .ok_or_else(|| ErrorEnvelope::expected(ErrorCode::internal(), "expected error"))?,
        );
        assert_eq!(error.code, ErrorCode::new("editor", "scope_not_editable"));
        Ok(())
    }

    #[test]
    fn reset_restores_defaults() -> Result<(), ErrorEnvelope> {
        let mut editor = editor()?;
        editor.update_button(
            ScopeKey::Company,
            1,
            ButtonPatch {
                url_property: Some("linkedin".to_owned()),
                ..ButtonPatch::default()
            },
        )?;
        editor.reset();
        assert_eq!(editor.settings(), &CanonicalSettings::defaults());
        assert!(editor.is_dirty());
        Ok(())
    }
}
