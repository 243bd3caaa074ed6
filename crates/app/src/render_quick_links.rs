//! Resolve the quick links shown on one record.

use crate::load_settings::{LoadReport, LoadSettingsDeps, load_settings};
use crate::log_fields;
use quick_links_domain::{
    ButtonDescriptor, DEFAULT_BUTTON_COUNT, PropertyValues, RenderedButton, ScopeKey,
    invalid_property_names, required_properties, resolve_buttons,
};
use quick_links_ports::{
    LogFields, LoggerPort, PropertyRequest, PropertySourcePort, RecordContext, SettingsStorePort,
};
use quick_links_shared::{RequestContext, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// Input payload for rendering a record's quick links.
#[derive(Debug, Clone)]
pub struct RenderQuickLinksInput {
    /// Record being viewed.
    pub record: RecordContext,
}

/// Dependencies required by render-quick-links.
#[derive(Clone)]
pub struct RenderQuickLinksDeps {
    /// Settings persistence backend.
    pub store: Arc<dyn SettingsStorePort>,
    /// Record property source.
    pub properties: Arc<dyn PropertySourcePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// What the panel should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// At least one actionable button.
    Buttons {
        /// Buttons in configured order.
        buttons: Vec<RenderedButton>,
    },
    /// Nothing to render; tell the user what to populate.
    Empty {
        /// Properties that would produce buttons.
        hint: EmptyStateHint,
    },
}

/// Guidance for the empty state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStateHint {
    /// URL properties to populate on the record.
    pub url_properties: Vec<String>,
    /// Label properties that may hold button labels.
    pub label_properties: Vec<String>,
}

impl EmptyStateHint {
    /// Build the hint for the descriptors of the selected scope.
    ///
    /// When nothing is configured the `button_url_N` / `button_label_N`
    /// convention is suggested.
    #[must_use]
    pub fn for_descriptors(descriptors: &[ButtonDescriptor]) -> Self {
        let url_properties = unique_trimmed(
            descriptors
                .iter()
                .filter(|descriptor| descriptor.is_actionable())
                .map(|descriptor| descriptor.url_property.as_str()),
        );
        if url_properties.is_empty() {
            return Self::conventional();
        }
        let label_properties = unique_trimmed(
            descriptors
                .iter()
                .filter(|descriptor| descriptor.is_actionable())
                .filter_map(ButtonDescriptor::label_source),
        );
        Self {
            url_properties,
            label_properties,
        }
    }

    /// The default property naming convention.
    #[must_use]
    pub fn conventional() -> Self {
        let numbered = |prefix: &str| {
            (1..=DEFAULT_BUTTON_COUNT)
                .map(|position| format!("{prefix}_{position}"))
                .collect::<Vec<_>>()
        };
        Self {
            url_properties: numbered("button_url"),
            label_properties: numbered("button_label"),
        }
    }

    /// One-line message for text output.
    #[must_use]
    pub fn message(&self) -> String {
        let mut message = format!(
            "No links configured. Populate the URL properties: {}",
            self.url_properties.join(", ")
        );
        if !self.label_properties.is_empty() {
            message.push_str("; label properties: ");
            message.push_str(&self.label_properties.join(", "));
        }
        message
    }
}

/// Output of render-quick-links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderQuickLinksOutput {
    /// Scope whose list was used.
    pub scope: ScopeKey,
    /// Properties requested from the property source.
    pub requested_properties: Vec<String>,
    /// Buttons or the empty state.
    pub outcome: RenderOutcome,
    /// How the settings were obtained.
    pub settings: LoadReport,
}

impl RenderQuickLinksOutput {
    /// Rendered buttons; empty for the empty state.
    #[must_use]
    pub fn buttons(&self) -> &[RenderedButton] {
        match &self.outcome {
            RenderOutcome::Buttons { buttons } => buttons,
            RenderOutcome::Empty { .. } => &[],
        }
    }
}

/// Load settings, fetch the needed properties, and resolve the buttons.
///
/// A settings load failure degrades to defaults. A property fetch failure is
/// returned as an error and nothing is rendered.
#[tracing::instrument(
    name = "quicklinks.render_quick_links",
    skip_all,
    fields(portal_id = %input.record.portal_id, object_type = %input.record.object_type)
)]
pub async fn render_quick_links(
    ctx: &RequestContext,
    deps: &RenderQuickLinksDeps,
    input: RenderQuickLinksInput,
) -> Result<RenderQuickLinksOutput> {
    let started_at = Instant::now();
    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "quicklinks.renderQuickLinks.start",
            "Render quick links started",
            Some(log_fields::record(&input.record)),
        );
    }

    let result: Result<RenderQuickLinksOutput> = (async {
        let load_deps = LoadSettingsDeps {
            store: Arc::clone(&deps.store),
            logger: deps.logger.clone(),
        };
        let loaded = load_settings(ctx, &load_deps, &input.record.portal_id).await;
        let (scope, descriptors) = loaded.settings.select(&input.record.object_type);

        let invalid = invalid_property_names(descriptors);
        if let (Some(logger), false) = (deps.logger.as_ref(), invalid.is_empty()) {
            let mut fields = log_fields::record(&input.record);
            log_fields::insert(&mut fields, "scope", scope.as_str());
            log_fields::insert(&mut fields, "invalidProperties", invalid);
            logger.warn(
                "quicklinks.renderQuickLinks.invalidProperty",
                "Configured property names are not valid and resolve to blank",
                Some(fields),
            );
        }

        let properties = required_properties(descriptors);
        let values = if properties.is_empty() {
            PropertyValues::new()
        } else {
            let request = PropertyRequest {
                record: input.record.clone(),
                properties: properties.clone(),
            };
            deps.properties.fetch(ctx, request).await?
        };

        let buttons = resolve_buttons(descriptors, &values);
        let outcome = if buttons.is_empty() {
            RenderOutcome::Empty {
                hint: EmptyStateHint::for_descriptors(descriptors),
            }
        } else {
            RenderOutcome::Buttons { buttons }
        };

        Ok(RenderQuickLinksOutput {
            scope,
            requested_properties: properties.iter().map(ToString::to_string).collect(),
            outcome,
            settings: loaded.report(),
        })
    })
    .await;

    match result {
        Ok(output) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.info(
                    "quicklinks.renderQuickLinks.completed",
                    "Render quick links completed",
                    Some(log_fields_completed(&input.record, &output, started_at)),
                );
            }
            Ok(output)
        },
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.error(
                    "quicklinks.renderQuickLinks.failed",
                    "Render quick links failed",
                    Some(log_fields::with_error(
                        log_fields::with_duration(log_fields::record(&input.record), started_at),
                        &error,
                    )),
                );
            }
            Err(error
                .with_metadata("portal_id", input.record.portal_id.as_str())
                .with_metadata("source", deps.properties.source_name()))
        },
    }
}

fn unique_trimmed<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .map(str::trim)
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_owned)
        .collect()
}

fn log_fields_completed(
    record: &RecordContext,
    output: &RenderQuickLinksOutput,
    started_at: Instant,
) -> LogFields {
    let mut fields = log_fields::record(record);
    log_fields::insert(&mut fields, "scope", output.scope.as_str());
    log_fields::insert(
        &mut fields,
        "requestedProperties",
        output.requested_properties.len(),
    );
    log_fields::insert(&mut fields, "buttonCount", output.buttons().len());
    log_fields::with_duration(fields, started_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_uses_configured_properties() {
        let descriptors = [
            ButtonDescriptor::with_property_label("website", "site_name", "Site"),
            ButtonDescriptor::with_static_label(" website ", "Again"),
            ButtonDescriptor::with_static_label("linkedin", "LinkedIn"),
            ButtonDescriptor::placeholder("Link 4"),
        ];
        let hint = EmptyStateHint::for_descriptors(&descriptors);
        assert_eq!(hint.url_properties, ["website", "linkedin"]);
        assert_eq!(hint.label_properties, ["site_name"]);
    }

    #[test]
    fn hint_falls_back_to_naming_convention() {
        let hint = EmptyStateHint::for_descriptors(&[ButtonDescriptor::placeholder("Link 1")]);
        assert_eq!(
            hint.message(),
            "No links configured. Populate the URL properties: button_url_1, button_url_2, \
             button_url_3; label properties: button_label_1, button_label_2, button_label_3"
        );
    }
}
