//! Resolve command handler.

use crate::commands::CommandEnv;
use crate::error::CliError;
use crate::output::{CliOutput, format_error_output, format_success};
use quick_links_app::{RenderOutcome, RenderQuickLinksInput, RenderQuickLinksOutput, render_quick_links};
use quick_links_infra::InfraResult;
use quick_links_shared::RequestContext;
use std::fmt::Write as _;
use std::path::Path;

/// Record selection for the resolve command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveArgs<'a> {
    pub portal: Option<&'a str>,
    pub object_type: Option<&'a str>,
    pub record_id: Option<&'a str>,
    pub properties: Option<&'a Path>,
}

/// Run the resolve command.
pub async fn run_resolve(env: &CommandEnv, args: ResolveArgs<'_>) -> Result<CliOutput, CliError> {
    match resolve(env, args).await {
        Ok(output) => format_resolve_output(env, &output),
        Err(error) => Ok(format_error_output(env.mode, &error)),
    }
}

async fn resolve(env: &CommandEnv, args: ResolveArgs<'_>) -> InfraResult<RenderQuickLinksOutput> {
    let runtime = env.runtime(args.properties).await?;
    let record = runtime.record_context(args.portal, args.object_type, args.record_id)?;
    let ctx = RequestContext::new_request();
    render_quick_links(&ctx, &runtime.render_deps(), RenderQuickLinksInput { record }).await
}

fn format_resolve_output(
    env: &CommandEnv,
    output: &RenderQuickLinksOutput,
) -> Result<CliOutput, CliError> {
    let payload = serde_json::to_value(output)?;
    let warnings: Vec<String> = output.settings.warning.iter().cloned().collect();
    format_success(env.mode, "resolve", payload, || render_text(output), &warnings)
}

fn render_text(output: &RenderQuickLinksOutput) -> String {
    let mut out = format!("scope: {}\n", output.scope);
    match &output.outcome {
        RenderOutcome::Buttons { buttons } => {
            for (position, button) in buttons.iter().enumerate() {
                let _ = writeln!(out, "{}. {} -> {}", position + 1, button.label, button.url);
            }
        },
        RenderOutcome::Empty { hint } => {
            out.push_str("status: empty\n");
            out.push_str(&hint.message());
            out.push('\n');
        },
    }
    out
}
