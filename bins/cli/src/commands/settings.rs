//! Settings command handlers: inspect, migrate, and edit stored settings.

use crate::commands::CommandEnv;
use crate::error::CliError;
use crate::output::{CliOutput, format_error_output, format_success};
use quick_links_app::{
    ButtonPatch, ConfigurationEditor, LoadedSettings, USING_DEFAULTS_WARNING, load_settings,
};
use quick_links_domain::{ButtonDescriptor, CanonicalSettings, DocumentShape, LabelType, ScopeKey};
use quick_links_infra::{InfraResult, QuickLinksRuntime};
use quick_links_shared::{ErrorCode, ErrorEnvelope, RequestContext};
use serde_json::{Map, Value, json};
use std::fmt::Write as _;

/// Requested settings operation. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    Show { scope: Option<ScopeKey> },
    Migrate { write: bool },
    Reset,
    Add { scope: ScopeKey },
    Remove { scope: ScopeKey, position: usize },
    Update {
        scope: ScopeKey,
        position: usize,
        patch: ButtonPatch,
    },
}

impl SettingsAction {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Show { .. } => "settings.show",
            Self::Migrate { .. } => "settings.migrate",
            Self::Reset => "settings.reset",
            Self::Add { .. } => "settings.add",
            Self::Remove { .. } => "settings.remove",
            Self::Update { .. } => "settings.update",
        }
    }
}

/// Result of a settings command, before rendering.
struct SettingsResult {
    payload: Value,
    text: String,
    warnings: Vec<String>,
}

/// Run a settings command against the configured store.
pub async fn run_settings(
    env: &CommandEnv,
    portal: Option<&str>,
    action: SettingsAction,
) -> Result<CliOutput, CliError> {
    let kind = action.kind();
    match settings(env, portal, action).await {
        Ok(result) => {
            let SettingsResult {
                payload,
                text,
                warnings,
            } = result;
            format_success(env.mode, kind, payload, || text, &warnings)
        },
        Err(error) => Ok(format_error_output(env.mode, &error)),
    }
}

async fn settings(
    env: &CommandEnv,
    portal: Option<&str>,
    action: SettingsAction,
) -> InfraResult<SettingsResult> {
    let runtime = env.runtime(None).await?;
    let portal_id = runtime.portal_id(portal)?;
    let ctx = RequestContext::new_request();
    let loaded = load_settings(&ctx, &runtime.load_deps(), &portal_id).await;

    match action {
        SettingsAction::Show { scope } => Ok(show(portal_id.as_str(), &loaded, scope)),
        SettingsAction::Migrate { write } => {
            if write {
                ensure_loaded(&loaded)?;
                save(&ctx, &runtime, ConfigurationEditor::from_loaded(portal_id.clone(), &loaded))
                    .await?;
            }
            let document = loaded.settings.to_document();
            let payload = json!({
                "portalId": portal_id.as_str(),
                "report": loaded.report(),
                "document": document,
                "written": write,
            });
            let mut text = format!("shape: {}\n", shape_name(loaded.shape));
            for note in &loaded.notes {
                let _ = writeln!(text, "note: {note}");
            }
            text.push_str(if write { "status: written\n" } else { "status: dry-run\n" });
            Ok(SettingsResult {
                payload,
                text,
                warnings: loaded.warning().into_iter().collect(),
            })
        },
        SettingsAction::Reset => {
            ensure_loaded(&loaded)?;
            let mut editor = ConfigurationEditor::from_loaded(portal_id, &loaded);
            editor.reset();
            let editor = save(&ctx, &runtime, editor).await?;
            Ok(edited(&editor, None, json!({})))
        },
        SettingsAction::Add { scope } => {
            ensure_loaded(&loaded)?;
            let mut editor = ConfigurationEditor::from_loaded(portal_id, &loaded);
            let index = editor.add_button(scope)?;
            let editor = save(&ctx, &runtime, editor).await?;
            Ok(edited(&editor, Some(scope), json!({ "position": index + 1 })))
        },
        SettingsAction::Remove { scope, position } => {
            ensure_loaded(&loaded)?;
            let mut editor = ConfigurationEditor::from_loaded(portal_id, &loaded);
            let removed = editor.remove_button(scope, to_index(position)?)?;
            let editor = save(&ctx, &runtime, editor).await?;
            Ok(edited(&editor, Some(scope), json!({ "removed": removed })))
        },
        SettingsAction::Update {
            scope,
            position,
            patch,
        } => {
            if patch.is_empty() {
                return Err(ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "nothing to update; pass at least one button field",
                ));
            }
            ensure_loaded(&loaded)?;
            let mut editor = ConfigurationEditor::from_loaded(portal_id, &loaded);
            editor.update_button(scope, to_index(position)?, patch)?;
            let editor = save(&ctx, &runtime, editor).await?;
            Ok(edited(&editor, Some(scope), json!({ "position": position })))
        },
    }
}

/// Edits start from what is stored; a failed load would overwrite it with defaults.
fn ensure_loaded(loaded: &LoadedSettings) -> InfraResult<()> {
    match &loaded.load_error {
        None => Ok(()),
        Some(error) => {
            let mut refused = error.clone();
            refused.message = format!(
                "{USING_DEFAULTS_WARNING}: {}; refusing to overwrite stored settings",
                error.reason_or("unknown error")
            );
            Err(refused)
        },
    }
}

async fn save(
    ctx: &RequestContext,
    runtime: &QuickLinksRuntime,
    editor: ConfigurationEditor,
) -> InfraResult<ConfigurationEditor> {
    let mut editor = editor.with_logger(runtime.logger());
    let store = runtime.store();
    editor.save(ctx, store.as_ref()).await.map_err(|failure| {
        let reason = failure.reason.clone();
        let mut error = ErrorEnvelope::from(failure);
        error.message = reason;
        error
    })?;
    Ok(editor)
}

fn to_index(position: usize) -> InfraResult<usize> {
    position.checked_sub(1).ok_or_else(|| {
        ErrorEnvelope::expected(ErrorCode::invalid_input(), "positions start at 1")
    })
}

fn show(portal_id: &str, loaded: &LoadedSettings, scope: Option<ScopeKey>) -> SettingsResult {
    let scopes = scopes_payload(&loaded.settings, scope);
    let payload = json!({
        "portalId": portal_id,
        "report": loaded.report(),
        "scopes": scopes,
    });
    let mut text = format!("portal: {portal_id}\nshape: {}\n", shape_name(loaded.shape));
    for (key, buttons) in loaded.settings.scopes() {
        if scope.is_none_or(|wanted| wanted == key) {
            render_scope(&mut text, key, buttons);
        }
    }
    SettingsResult {
        payload,
        text,
        warnings: loaded.warning().into_iter().collect(),
    }
}

fn edited(editor: &ConfigurationEditor, scope: Option<ScopeKey>, extra: Value) -> SettingsResult {
    let mut payload = Map::new();
    payload.insert("portalId".to_owned(), Value::from(editor.portal_id().as_str()));
    payload.insert("scopes".to_owned(), scopes_payload(editor.settings(), scope));
    if let Value::Object(extra) = extra {
        payload.extend(extra);
    }

    let mut text = String::from("status: saved\n");
    for (key, buttons) in editor.settings().scopes() {
        if scope.is_none_or(|wanted| wanted == key) {
            render_scope(&mut text, key, buttons);
        }
    }
    SettingsResult {
        payload: Value::Object(payload),
        text,
        warnings: Vec::new(),
    }
}

fn scopes_payload(settings: &CanonicalSettings, scope: Option<ScopeKey>) -> Value {
    settings
        .scopes()
        .filter(|(key, _)| scope.is_none_or(|wanted| wanted == *key))
        .map(|(key, buttons)| (key.as_str().to_owned(), json!(buttons)))
        .collect::<Map<String, Value>>()
        .into()
}

fn render_scope(out: &mut String, scope: ScopeKey, buttons: &[ButtonDescriptor]) {
    let _ = writeln!(out, "{scope}:");
    for (position, button) in buttons.iter().enumerate() {
        let url = if button.url_property.trim().is_empty() {
            "<unset>"
        } else {
            button.url_property.as_str()
        };
        let label = match button.label_type {
            LabelType::Static => format!("{:?}", button.static_label),
            LabelType::Property => format!(
                "property {} (fallback {:?})",
                button.label_property.as_deref().unwrap_or("<unset>"),
                button.static_label
            ),
        };
        let _ = writeln!(out, "  {}. {label} <- {url}", position + 1);
    }
}

const fn shape_name(shape: DocumentShape) -> &'static str {
    match shape {
        DocumentShape::Scoped => "scoped",
        DocumentShape::LegacySingleArray => "legacy_single_array",
        DocumentShape::Unrecognized => "unrecognized",
    }
}
