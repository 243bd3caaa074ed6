//! Button resolution: descriptors plus fetched property values to renderable buttons.

use crate::descriptor::{ButtonDescriptor, LabelType, RenderedButton};
use crate::extract::{PropertyValues, extract_named};
use crate::primitives::PropertyName;
use crate::url::normalize_url;
use std::collections::BTreeSet;

/// Resolve descriptors against fetched property values.
///
/// Output order follows input order. Descriptors without a URL property, or
/// whose URL property resolves to blank, are dropped. A property-sourced label
/// that resolves to `""` falls back to the static label; if that is blank as
/// well the URL doubles as the label. Pure and total.
#[must_use]
pub fn resolve_buttons(
    descriptors: &[ButtonDescriptor],
    values: &PropertyValues,
) -> Vec<RenderedButton> {
    descriptors
        .iter()
        .filter_map(|descriptor| resolve_one(descriptor, values))
        .collect()
}

fn resolve_one(descriptor: &ButtonDescriptor, values: &PropertyValues) -> Option<RenderedButton> {
    if !descriptor.is_actionable() {
        return None;
    }
    let url = normalize_url(&extract_named(values, descriptor.url_property.trim()));
    if url.is_empty() {
        return None;
    }

    let from_property = match descriptor.label_type {
        LabelType::Static => String::new(),
        LabelType::Property => descriptor
            .label_property
            .as_deref()
            .map(|name| extract_named(values, name.trim()))
            .unwrap_or_default(),
    };
    // Labels are shown verbatim; only an empty value falls back.
    let label = match (from_property.is_empty(), descriptor.static_label.trim().is_empty()) {
        (false, _) => from_property,
        (true, false) => descriptor.static_label.clone(),
        (true, true) => url.clone(),
    };

    Some(RenderedButton { url, label })
}

/// Property names the resolver will read for `descriptors`.
///
/// Union of the URL property and, for property labels, the label property of
/// every actionable descriptor. Sorted and deduplicated. Names that cannot be
/// valid CRM property names are left out; they always resolve to blank and
/// [`invalid_property_names`] reports them.
#[must_use]
pub fn required_properties(descriptors: &[ButtonDescriptor]) -> BTreeSet<PropertyName> {
    referenced_names(descriptors)
        .filter_map(|name| PropertyName::parse(name).ok())
        .collect()
}

/// Referenced property names that [`required_properties`] had to skip.
///
/// Sorted and deduplicated, as written in the descriptors.
#[must_use]
pub fn invalid_property_names(descriptors: &[ButtonDescriptor]) -> Vec<String> {
    referenced_names(descriptors)
        .filter(|name| PropertyName::parse(name).is_err())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn referenced_names(descriptors: &[ButtonDescriptor]) -> impl Iterator<Item = &str> {
    descriptors
        .iter()
        .filter(|descriptor| descriptor.is_actionable())
        .flat_map(|descriptor| [Some(descriptor.url_property.as_str()), descriptor.label_source()])
        .flatten()
}
