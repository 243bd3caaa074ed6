//! Logger adapters: structured JSON lines, or forwarding into `tracing`.

use crate::log_sink::LogSink;
use quick_links_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use quick_links_shared::{REDACTED, is_secret_key};
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }

        let fields = merged_fields(&self.base_fields, event.fields);
        let mut payload = serde_json::Map::new();
        payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
        payload.insert("level".to_string(), Value::from(event.level.as_str()));
        payload.insert("event".to_string(), Value::from(&*event.event));
        payload.insert("message".to_string(), Value::from(&*event.message));
        if !fields.is_empty() {
            let map = fields
                .into_iter()
                .map(|(key, value)| (key.into_string(), value))
                .collect();
            payload.insert("fields".to_string(), Value::Object(map));
        }
        if let Some(mut error) = event.error {
            redact_value(&mut error);
            payload.insert("error".to_string(), error);
        }

        let line = serde_json::to_string(&Value::Object(payload)).map_or_else(
            |_| {
                "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n"
                    .to_string()
            },
            |mut encoded| {
                encoded.push('\n');
                encoded
            },
        );
        self.sink.write_line(&line);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged_fields(&self.base_fields, Some(fields)),
            min_level: self.min_level,
        })
    }
}

/// Logger that re-emits events through `tracing`, so a subscriber installed
/// by the binary decides formatting and filtering.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    base_fields: LogFields,
}

impl TracingLogger {
    /// Create a logger with no base fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        let fields = merged_fields(&self.base_fields, event.fields);
        let fields = if fields.is_empty() {
            String::new()
        } else {
            Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key.into_string(), value))
                    .collect(),
            )
            .to_string()
        };
        let error = event
            .error
            .map(|mut error| {
                redact_value(&mut error);
                error.to_string()
            })
            .unwrap_or_default();
        let name: &str = &event.event;
        let message: &str = &event.message;
        let (fields, error) = (fields.as_str(), error.as_str());

        match event.level {
            LogLevel::Debug => tracing::debug!(event = name, fields, error, "{message}"),
            LogLevel::Info => tracing::info!(event = name, fields, error, "{message}"),
            LogLevel::Warn => tracing::warn!(event = name, fields, error, "{message}"),
            LogLevel::Error => tracing::error!(event = name, fields, error, "{message}"),
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self {
            base_fields: merged_fields(&self.base_fields, Some(fields)),
        })
    }
}

fn merged_fields(base: &LogFields, extra: Option<LogFields>) -> LogFields {
    let mut fields = base.clone();
    fields.extend(extra.unwrap_or_default());
    for (key, value) in &mut fields {
        if is_secret_key(key) {
            *value = Value::String(REDACTED.to_string());
        } else {
            redact_value(value);
        }
    }
    fields
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_secret_key(key) {
                    *nested = Value::String(REDACTED.to_string());
                } else {
                    redact_value(nested);
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {},
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use serde_json::json;

    fn only_line(sink: &MemoryLogSink) -> Result<Value, Box<dyn std::error::Error>> {
        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        let line = lines.first().ok_or("missing line")?;
        Ok(serde_json::from_str(line.trim())?)
    }

    #[test]
    fn json_logger_redacts_tokens_in_fields_and_errors() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone());

        let mut fields = LogFields::new();
        fields.insert("apiToken".into(), json!("pat-secret"));
        fields.insert("portalId".into(), json!("4242"));

        logger.log(
            LogEvent::new(LogLevel::Warn, "quicklinks.load.failed", "using defaults", Some(fields))
                .with_error(json!({ "metadata": { "authorization": "Bearer x", "status": "503" } })),
        );

        let payload = only_line(&sink)?;
        assert_eq!(payload.pointer("/level"), Some(&json!("warn")));
        assert_eq!(payload.pointer("/fields/apiToken"), Some(&json!(REDACTED)));
        assert_eq!(payload.pointer("/fields/portalId"), Some(&json!("4242")));
        assert_eq!(
            payload.pointer("/error/metadata/authorization"),
            Some(&json!(REDACTED))
        );
        assert_eq!(payload.pointer("/error/metadata/status"), Some(&json!("503")));
        Ok(())
    }

    #[test]
    fn events_below_min_level_are_dropped() {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Warn);

        logger.info("quicklinks.render.started", "render", None);
        logger.debug("quicklinks.render.started", "render", None);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn child_logger_merges_fields() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::default());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Debug);

        let mut base = LogFields::new();
        base.insert("correlationId".into(), json!("req_123"));
        let child = logger.child(base);
        child.info("quicklinks.child", "child log", None);

        let payload = only_line(&sink)?;
        assert_eq!(payload.pointer("/fields/correlationId"), Some(&json!("req_123")));
        Ok(())
    }

    #[test]
    fn tracing_logger_accepts_every_level() {
        let logger = TracingLogger::new().child(LogFields::new());
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            logger.log(LogEvent::new(level, "quicklinks.test", "message", None));
        }
    }
}
