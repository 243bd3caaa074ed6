//! End-to-end use case tests over in-memory adapters.

use quick_links_adapters::{HostSettingsStore, JsonLogger, MemoryLogSink, StaticPropertySource};
use quick_links_app::{
    ButtonPatch, ConfigurationEditor, LoadSettingsDeps, RenderOutcome, RenderQuickLinksDeps,
    RenderQuickLinksInput, load_settings, render_quick_links,
};
use quick_links_domain::{
    ButtonDescriptor, CanonicalSettings, LabelType, ObjectType, PortalId, PropertyValues,
    RecordId, RenderedButton, ScopeKey,
};
use quick_links_ports::{
    BoxFuture, LoggerPort, PropertyRequest, PropertySourcePort, RecordContext, SettingsDocument,
    SettingsStorePort,
};
use quick_links_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

struct FailingStore {
    load_error: Option<ErrorEnvelope>,
    save_error: Option<ErrorEnvelope>,
}

impl SettingsStorePort for FailingStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    fn load(
        &self,
        _ctx: &RequestContext,
        _portal_id: &PortalId,
    ) -> BoxFuture<'_, Result<Option<Value>>> {
        let outcome = self.load_error.clone().map_or(Ok(None), Err);
        Box::pin(async move { outcome })
    }

    fn save(
        &self,
        _ctx: &RequestContext,
        _portal_id: &PortalId,
        _document: SettingsDocument,
    ) -> BoxFuture<'_, Result<()>> {
        let outcome = self.save_error.clone().map_or(Ok(()), Err);
        Box::pin(async move { outcome })
    }
}

#[derive(Default)]
struct RecordingSource {
    values: PropertyValues,
    requests: Mutex<Vec<Vec<String>>>,
    fail: bool,
}

impl RecordingSource {
    fn requests(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl PropertySourcePort for RecordingSource {
    fn source_name(&self) -> &'static str {
        "recording"
    }

    fn fetch(
        &self,
        _ctx: &RequestContext,
        request: PropertyRequest,
    ) -> BoxFuture<'_, Result<PropertyValues>> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.properties.iter().map(ToString::to_string).collect());
        }
        let outcome = if self.fail {
            Err(ErrorEnvelope::expected(
                ErrorCode::permission_denied(),
                "record is not visible",
            ))
        } else {
            Ok(self.values.clone())
        };
        Box::pin(async move { outcome })
    }
}

fn record(object_type: &str) -> Result<RecordContext> {
    Ok(RecordContext {
        portal_id: PortalId::parse("4242").map_err(ErrorEnvelope::from)?,
        object_type: ObjectType::parse(object_type).map_err(ErrorEnvelope::from)?,
        record_id: Some(RecordId::parse("901").map_err(ErrorEnvelope::from)?),
    })
}

fn values(pairs: &[(&str, Value)]) -> PropertyValues {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), value.clone()))
        .collect()
}

#[tokio::test]
async fn legacy_document_renders_for_company_records() -> Result<()> {
    let ctx = RequestContext::new_request();
    let portal = PortalId::parse("4242").map_err(ErrorEnvelope::from)?;
    let store = HostSettingsStore::with_entries([(
        portal,
        json!({
            "buttons": [
                { "urlProperty": "website", "labelType": "property",
                  "labelProperty": "site_name", "staticLabel": "Site" },
                { "urlProperty": "", "labelType": "static", "staticLabel": "Unused" },
                { "urlProperty": "linkedin_url", "staticLabel": "LinkedIn" }
            ]
        }),
    )]);
    let source = Arc::new(RecordingSource {
        values: values(&[
            ("website", json!({ "value": "acme.com" })),
            ("site_name", json!("")),
            ("linkedin_url", json!("https://linkedin.com/company/acme")),
        ]),
        ..RecordingSource::default()
    });
    let deps = RenderQuickLinksDeps {
        store: Arc::new(store),
        properties: source.clone(),
        logger: None,
    };

    let output = render_quick_links(
        &ctx,
        &deps,
        RenderQuickLinksInput {
            record: record("COMPANY")?,
        },
    )
    .await?;

    assert_eq!(output.scope, ScopeKey::Company);
    assert_eq!(
        output.buttons(),
        [
            RenderedButton {
                url: "https://acme.com".to_owned(),
                label: "Site".to_owned(),
            },
            RenderedButton {
                url: "https://linkedin.com/company/acme".to_owned(),
                label: "LinkedIn".to_owned(),
            },
        ]
        .as_slice()
    );
    assert_eq!(
        source.requests(),
        vec![vec![
            "linkedin_url".to_owned(),
            "site_name".to_owned(),
            "website".to_owned()
        ]]
    );
    Ok(())
}

#[tokio::test]
async fn defaults_render_empty_state_without_fetching() -> Result<()> {
    let ctx = RequestContext::new_request();
    let source = Arc::new(RecordingSource::default());
    let deps = RenderQuickLinksDeps {
        store: Arc::new(HostSettingsStore::in_memory()),
        properties: source.clone(),
        logger: None,
    };

    let output = render_quick_links(
        &ctx,
        &deps,
        RenderQuickLinksInput {
            record: record("CONTACT")?,
        },
    )
    .await?;

    match output.outcome {
        RenderOutcome::Empty { hint } => {
            assert_eq!(
                hint.url_properties,
                ["button_url_1", "button_url_2", "button_url_3"]
            );
        },
        RenderOutcome::Buttons { buttons } => {
            return Err(ErrorEnvelope::expected(
                ErrorCode::internal(),
                format!("expected empty state, got {buttons:?}"),
            ));
        },
    }
    assert!(source.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn load_failure_degrades_to_defaults_with_warning() -> Result<()> {
    let ctx = RequestContext::new_request();
    let deps = RenderQuickLinksDeps {
        store: Arc::new(FailingStore {
            load_error: Some(ErrorEnvelope::expected(
                ErrorCode::dependency_unavailable(),
                "settings service is down",
            )),
            save_error: None,
        }),
        properties: Arc::new(StaticPropertySource::default()),
        logger: None,
    };

    let output = render_quick_links(
        &ctx,
        &deps,
        RenderQuickLinksInput {
            record: record("CONTACT")?,
        },
    )
    .await?;

    assert!(output.buttons().is_empty());
    assert_eq!(
        output.settings.warning.as_deref(),
        Some("Unable to load settings; using defaults: settings service is down")
    );
    Ok(())
}

#[tokio::test]
async fn property_fetch_failure_is_reported() -> Result<()> {
    let ctx = RequestContext::new_request();
    let portal = PortalId::parse("4242").map_err(ErrorEnvelope::from)?;
    let stored = CanonicalSettings::defaults()
        .with_buttons(
            ScopeKey::Contact,
            vec![ButtonDescriptor::with_static_label("website", "Site")],
        )
        .to_json()
        .map_err(|error| ErrorEnvelope::expected(ErrorCode::internal(), error.to_string()))?;
    let sink = Arc::new(MemoryLogSink::default());
    let logger: Arc<dyn LoggerPort> = Arc::new(JsonLogger::new(sink.clone()));
    let deps = RenderQuickLinksDeps {
        store: Arc::new(HostSettingsStore::with_entries([(portal, stored)])),
        properties: Arc::new(RecordingSource {
            fail: true,
            ..RecordingSource::default()
        }),
        logger: Some(logger),
    };

    let error = render_quick_links(
        &ctx,
        &deps,
        RenderQuickLinksInput {
            record: record("CONTACT")?,
        },
    )
    .await
    .err()
    .ok_or_else(|| ErrorEnvelope::expected(ErrorCode::internal(), "expected fetch error"))?;

    assert_eq!(error.code, ErrorCode::permission_denied());
    assert_eq!(error.metadata.get("source").map(String::as_str), Some("recording"));
    let lines = sink.take();
    assert!(
        lines
            .iter()
            .any(|line| line.contains("\"event\":\"quicklinks.renderQuickLinks.failed\""))
    );
    Ok(())
}

#[tokio::test]
async fn invalid_property_names_are_logged() -> Result<()> {
    let ctx = RequestContext::new_request();
    let portal = PortalId::parse("4242").map_err(ErrorEnvelope::from)?;
    let stored = CanonicalSettings::defaults()
        .with_buttons(
            ScopeKey::Contact,
            vec![
                ButtonDescriptor::with_static_label("website", "Site"),
                ButtonDescriptor::with_property_label("linked in", "label/name", "LinkedIn"),
            ],
        )
        .to_json()
        .map_err(|error| ErrorEnvelope::expected(ErrorCode::internal(), error.to_string()))?;
    let sink = Arc::new(MemoryLogSink::default());
    let logger: Arc<dyn LoggerPort> = Arc::new(JsonLogger::new(sink.clone()));
    let source = Arc::new(RecordingSource {
        values: values(&[("website", json!("acme.example"))]),
        ..RecordingSource::default()
    });
    let deps = RenderQuickLinksDeps {
        store: Arc::new(HostSettingsStore::with_entries([(portal, stored)])),
        properties: source.clone(),
        logger: Some(logger),
    };

    let output = render_quick_links(
        &ctx,
        &deps,
        RenderQuickLinksInput {
            record: record("CONTACT")?,
        },
    )
    .await?;

    assert_eq!(output.requested_properties, ["website"]);
    assert_eq!(source.requests(), vec![vec!["website".to_owned()]]);
    let warning = sink
        .take()
        .into_iter()
        .find(|line| line.contains("\"event\":\"quicklinks.renderQuickLinks.invalidProperty\""))
        .ok_or_else(|| ErrorEnvelope::expected(ErrorCode::internal(), "warning not logged"))?;
    let payload: Value = serde_json::from_str(&warning)
        .map_err(|error| ErrorEnvelope::expected(ErrorCode::internal(), error.to_string()))?;
    assert_eq!(
        payload.pointer("/fields/invalidProperties"),
        Some(&json!(["label/name", "linked in"]))
    );
    Ok(())
}

#[tokio::test]
async fn editor_round_trips_through_the_store() -> Result<()> {
    let ctx = RequestContext::new_request();
    let portal = PortalId::parse("4242").map_err(ErrorEnvelope::from)?;
    let store = Arc::new(HostSettingsStore::in_memory());
    let load_deps = LoadSettingsDeps {
        store: store.clone(),
        logger: None,
    };

    let loaded = load_settings(&ctx, &load_deps, &portal).await;
    let mut editor = ConfigurationEditor::from_loaded(portal.clone(), &loaded);
    editor.update_button(
        ScopeKey::Contact,
        0,
        ButtonPatch {
            url_property: Some("website".to_owned()),
            label_type: Some(LabelType::Property),
            label_property: Some("site_name".to_owned()),
            static_label: Some("Site".to_owned()),
        },
    )?;
    editor.add_button(ScopeKey::Contact)?;
    editor.save(&ctx, store.as_ref()).await?;
    assert!(!editor.is_dirty());

    let reloaded = load_settings(&ctx, &load_deps, &portal).await;
    assert_eq!(&reloaded.settings, editor.settings());
    assert_eq!(
        reloaded.settings.buttons(ScopeKey::Contact).map(<[_]>::len),
        Some(4)
    );
    Ok(())
}

#[tokio::test]
async fn failed_save_keeps_edits_and_reason() -> Result<()> {
    let ctx = RequestContext::new_request();
    let portal = PortalId::parse("4242").map_err(ErrorEnvelope::from)?;
    let store = FailingStore {
        load_error: None,
        save_error: Some(ErrorEnvelope::expected(ErrorCode::io(), "  ")),
    };
    let mut editor = ConfigurationEditor::new(portal, CanonicalSettings::defaults());
    editor.add_button(ScopeKey::Company)?;
    let edited = editor.settings().clone();

    let failure = editor
        .save(&ctx, &store)
        .await
        .err()
        .ok_or_else(|| ErrorEnvelope::expected(ErrorCode::internal(), "expected save failure"))?;

    assert_eq!(failure.reason, "Failed to save settings");
    assert!(editor.is_dirty());
    assert_eq!(editor.settings(), &edited);
    Ok(())
}
