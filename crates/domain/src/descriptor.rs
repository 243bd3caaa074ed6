//! Button descriptors (persisted configuration) and rendered buttons.

use serde::{Deserialize, Serialize};

/// Upper bound on descriptors per scope, enforced by the editor and migrator.
pub const MAX_BUTTONS_PER_SCOPE: usize = 10;

/// Number of placeholder descriptors in the built-in default.
pub const DEFAULT_BUTTON_COUNT: usize = 3;

/// Which descriptor field supplies the button label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    /// Label is read from a record property.
    Property,
    /// Label is the descriptor's static text.
    #[default]
    Static,
}

impl LabelType {
    /// Wire value (`"property"` / `"static"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Static => "static",
        }
    }
}

/// Persisted configuration for one button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonDescriptor {
    /// Property supplying the URL; empty means unconfigured.
    pub url_property: String,
    /// Source of the label.
    pub label_type: LabelType,
    /// Property supplying the label; present iff `label_type` is `Property`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_property: Option<String>,
    /// Default label, also the fallback for an empty property label.
    pub static_label: String,
}

impl ButtonDescriptor {
    /// Unconfigured descriptor with a static label.
    pub fn placeholder(static_label: impl Into<String>) -> Self {
        Self {
            url_property: String::new(),
            label_type: LabelType::Static,
            label_property: None,
            static_label: static_label.into(),
        }
    }

    /// Descriptor with a URL property and a static label.
    pub fn with_static_label(url_property: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url_property: url_property.into(),
            label_type: LabelType::Static,
            label_property: None,
            static_label: label.into(),
        }
    }

    /// Descriptor whose label is read from `label_property`, falling back to `fallback`.
    pub fn with_property_label(
        url_property: impl Into<String>,
        label_property: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            url_property: url_property.into(),
            label_type: LabelType::Property,
            label_property: Some(label_property.into()),
            static_label: fallback.into(),
        }
    }

    /// True when a URL property is configured.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        !self.url_property.trim().is_empty()
    }

    /// Label property to fetch, if the label is property-sourced and named.
    #[must_use]
    pub fn label_source(&self) -> Option<&str> {
        match self.label_type {
            LabelType::Property => self
                .label_property
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty()),
            LabelType::Static => None,
        }
    }
}

/// Default label for the descriptor at `position` (1-based).
#[must_use]
pub fn default_label(position: usize) -> String {
    format!("Link {position}")
}

/// The built-in default list: three unconfigured `Link N` placeholders.
#[must_use]
pub fn default_descriptors() -> Vec<ButtonDescriptor> {
    (1..=DEFAULT_BUTTON_COUNT)
        .map(|position| ButtonDescriptor::placeholder(default_label(position)))
        .collect()
}

/// A button ready to render for the current record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedButton {
    /// Scheme-qualified destination.
    pub url: String,
    /// Non-empty display label.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_wire_shape_is_camel_case() -> Result<(), serde_json::Error> {
        let descriptor = ButtonDescriptor::with_property_label("website", "site_name", "Site");
        assert_eq!(
            serde_json::to_value(&descriptor)?,
            json!({
                "urlProperty": "website",
                "labelType": "property",
                "labelProperty": "site_name",
                "staticLabel": "Site",
            })
        );

        let placeholder = serde_json::to_value(ButtonDescriptor::placeholder("Link 1"))?;
        assert!(placeholder.get("labelProperty").is_none());
        Ok(())
    }

    #[test]
    fn actionable_requires_non_blank_url_property() {
        assert!(!ButtonDescriptor::placeholder("Link 1").is_actionable());
        assert!(!ButtonDescriptor::with_static_label("   ", "x").is_actionable());
        assert!(ButtonDescriptor::with_static_label("linkedin", "LinkedIn").is_actionable());
    }

    #[test]
    fn label_source_ignores_static_and_blank_properties() {
        let static_label = ButtonDescriptor::with_static_label("u", "Visit");
        assert_eq!(static_label.label_source(), None);

        let blank = ButtonDescriptor::with_property_label("u", "  ", "Visit");
        assert_eq!(blank.label_source(), None);

        let named = ButtonDescriptor::with_property_label("u", "lbl", "Visit");
        assert_eq!(named.label_source(), Some("lbl"));
    }

    #[test]
    fn defaults_are_three_link_placeholders() {
        let labels: Vec<_> = default_descriptors()
            .into_iter()
            .map(|descriptor| descriptor.static_label)
            .collect();
        assert_eq!(labels, ["Link 1", "Link 2", "Link 3"]);
    }
}
