//! Integration coverage: stored document to rendered buttons.

use quick_links_domain::{
    ButtonDescriptor, CanonicalSettings, ObjectType, PrimitiveError, PropertyValues, ScopeKey,
    migrate, required_properties, resolve_buttons,
};
use quick_links_shared::ErrorEnvelope;
use serde_json::json;
use std::error::Error;

#[test]
fn legacy_document_renders_on_any_record_type() -> Result<(), Box<dyn Error>> {
    let settings = migrate(&json!({
        "buttons": [
            { "urlProperty": "website", "labelType": "static", "staticLabel": "Website" },
            { "urlProperty": "", "labelType": "static", "staticLabel": "Link 2" },
            { "urlProperty": "portal_url", "labelType": "property", "labelProperty": "portal_name", "staticLabel": "Portal" },
        ]
    }));

    let mut values = PropertyValues::new();
    values.insert("website".into(), json!({ "value": "acme.com" }));
    values.insert("portal_url".into(), json!("https://portal.acme.com"));
    values.insert("portal_name".into(), json!(null));

    for object_type in ["CONTACT", "COMPANY", "DEAL"] {
        let (_, descriptors) = settings.select(&ObjectType::parse(object_type)?);
        let names: Vec<_> = required_properties(descriptors)
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, ["portal_name", "portal_url", "website"]);

        let rendered = resolve_buttons(descriptors, &values);
        let pairs: Vec<_> = rendered
            .iter()
            .map(|button| (button.url.as_str(), button.label.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("https://acme.com", "Website"),
                ("https://portal.acme.com", "Portal"),
            ]
        );
    }
    Ok(())
}

#[test]
fn canonical_document_survives_a_second_migration() -> Result<(), Box<dyn Error>> {
    let settings = CanonicalSettings::defaults().with_buttons(
        ScopeKey::Company,
        vec![ButtonDescriptor::with_property_label("domain", "name", "Company site")],
    );

    let reloaded = migrate(&settings.to_json()?);
    assert_eq!(reloaded, settings);
    Ok(())
}

#[test]
fn primitive_errors_map_into_error_envelopes() -> Result<(), Box<dyn Error>> {
    let error = ObjectType::parse("  ")
        .err()
        .ok_or("blank object type was accepted")?;
    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "domain");
    assert_eq!(envelope.code.code(), "invalid_object_type");
    assert_eq!(envelope.metadata.get("input_length"), Some(&"2".to_string()));

    let scope_error: PrimitiveError = "ticket"
        .parse::<ScopeKey>()
        .err()
        .ok_or("unknown scope was accepted")?;
    let envelope: ErrorEnvelope = scope_error.into();
    assert_eq!(envelope.code.code(), "unknown_scope");
    assert_eq!(envelope.metadata.get("input"), Some(&"ticket".to_string()));
    Ok(())
}
