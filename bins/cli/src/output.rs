//! Rendering command results and errors for stdout/stderr.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use quick_links_infra::{InfraError, redact_if_secret};
use serde_json::{Map, Value, json};

pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: ExitCode,
}

impl CliOutput {
    pub const fn ok(stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: ExitCode::Ok,
        }
    }
}

/// Render a successful command.
///
/// `payload` is the JSON body; `text` renders the same result for humans.
pub fn format_success(
    mode: OutputMode,
    kind: &str,
    payload: Value,
    text: impl FnOnce() -> String,
    warnings: &[String],
) -> Result<CliOutput, CliError> {
    let mut stderr = String::new();
    for warning in warnings {
        log_line(&mut stderr, "warning", warning, mode.no_progress);
    }

    let stdout = if mode.is_ndjson() {
        let mut summary = Map::new();
        summary.insert("type".to_owned(), Value::from("summary"));
        summary.insert("status".to_owned(), Value::from("ok"));
        summary.insert("kind".to_owned(), Value::from(kind));
        summary.insert("result".to_owned(), payload);
        let mut out = serde_json::to_string(&Value::Object(summary))?;
        out.push('\n');
        out
    } else if mode.is_json() {
        let mut out = serde_json::to_string_pretty(&json!({
            "status": "ok",
            "kind": kind,
            "result": payload,
        }))?;
        out.push('\n');
        out
    } else {
        text()
    };

    Ok(CliOutput::ok(stdout, stderr))
}

pub fn format_error_output(mode: OutputMode, error: &InfraError) -> CliOutput {
    let exit_code = ExitCode::for_envelope(error);
    let payload = error_payload(error);

    let mut stderr = String::new();
    log_line(&mut stderr, "info", "command failed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        let mut out = serde_json::to_string(&json!({
            "type": "error",
            "status": "error",
            "error": payload,
        }))
        .unwrap_or_else(|_| {
            "{\"type\":\"error\",\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}".to_owned()
        });
        out.push('\n');
        out
    } else if mode.is_json() {
        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut out = serde_json::to_string_pretty(&json!({
            "status": "error",
            "error": payload,
        }))
        .unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}".to_owned()
        });
        out.push('\n');
        out
    } else {
        format_error_text(error)
    };

    CliOutput {
        stdout,
        stderr,
        exit_code,
    }
}

fn error_payload(error: &InfraError) -> Value {
    let meta: Map<String, Value> = error
        .metadata
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(redact_if_secret(key, value))))
        .collect();
    let mut payload = Map::new();
    payload.insert("code".to_owned(), Value::from(error.code.to_string()));
    payload.insert("message".to_owned(), Value::from(error.message.as_str()));
    payload.insert("kind".to_owned(), Value::from(error.kind.to_string()));
    payload.insert(
        "retriable".to_owned(),
        Value::from(error.class.is_retriable()),
    );
    if !meta.is_empty() {
        payload.insert("meta".to_owned(), Value::Object(meta));
    }
    Value::Object(payload)
}

fn format_error_text(error: &InfraError) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&redact_if_secret(key, value));
            out.push('\n');
        }
    }
    out
}

pub fn log_line(stderr: &mut String, level: &str, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str(level);
    stderr.push_str(": ");
    stderr.push_str(message);
    stderr.push('\n');
}
