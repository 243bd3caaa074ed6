//! Canonical settings document.

use crate::descriptor::{ButtonDescriptor, default_descriptors};
use crate::primitives::ObjectType;
use crate::scope::ScopeKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Up-to-date representation every historical document migrates into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalSettings {
    buttons_by_scope: BTreeMap<ScopeKey, Vec<ButtonDescriptor>>,
}

/// Persisted wire shape written by every settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    /// Buttons for contact records.
    pub contact_buttons: Vec<ButtonDescriptor>,
    /// Buttons for company records.
    pub company_buttons: Vec<ButtonDescriptor>,
}

impl CanonicalSettings {
    /// Built-in default: the placeholder list for both contact and company.
    #[must_use]
    pub fn defaults() -> Self {
        let mut settings = Self::default();
        for scope in ScopeKey::EDITABLE {
            settings.set_buttons(scope, default_descriptors());
        }
        settings
    }

    /// Descriptor list for `scope`, if present.
    #[must_use]
    pub fn buttons(&self, scope: ScopeKey) -> Option<&[ButtonDescriptor]> {
        self.buttons_by_scope.get(&scope).map(Vec::as_slice)
    }

    /// Replace the whole list for `scope`.
    pub fn set_buttons(&mut self, scope: ScopeKey, buttons: Vec<ButtonDescriptor>) {
        self.buttons_by_scope.insert(scope, buttons);
    }

    /// Builder-style variant of [`Self::set_buttons`].
    #[must_use]
    pub fn with_buttons(mut self, scope: ScopeKey, buttons: Vec<ButtonDescriptor>) -> Self {
        self.set_buttons(scope, buttons);
        self
    }

    /// Iterate scopes in stable order.
    pub fn scopes(&self) -> impl Iterator<Item = (ScopeKey, &[ButtonDescriptor])> {
        self.buttons_by_scope
            .iter()
            .map(|(scope, buttons)| (*scope, buttons.as_slice()))
    }

    /// Pick the list that applies to a record of `object_type`.
    ///
    /// Contact and company records use their own list. Other record types use
    /// the legacy shared list, then the contact list. A dedicated scope
    /// without data also falls back to the legacy shared list.
    #[must_use]
    pub fn select(&self, object_type: &ObjectType) -> (ScopeKey, &[ButtonDescriptor]) {
        let dedicated = ScopeKey::for_object_type(object_type);
        let candidates = [dedicated, Some(ScopeKey::LegacyShared), Some(ScopeKey::Contact)];
        candidates
            .into_iter()
            .flatten()
            .find_map(|scope| self.buttons(scope).map(|buttons| (scope, buttons)))
            .unwrap_or((dedicated.unwrap_or(ScopeKey::Contact), &[]))
    }

    /// Convert to the wire document. Scopes that are absent are written empty.
    #[must_use]
    pub fn to_document(&self) -> SettingsDocument {
        let scoped = |scope| self.buttons(scope).map(<[_]>::to_vec).unwrap_or_default();
        SettingsDocument {
            contact_buttons: scoped(ScopeKey::Contact),
            company_buttons: scoped(ScopeKey::Company),
        }
    }

    /// Serialize the wire document to a JSON value.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.to_document())
    }
}

impl From<SettingsDocument> for CanonicalSettings {
    fn from(document: SettingsDocument) -> Self {
        Self::default()
            .with_buttons(ScopeKey::Contact, document.contact_buttons)
            .with_buttons(ScopeKey::Company, document.company_buttons)
    }
}
