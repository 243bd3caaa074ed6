//! Logger selection for CLI surfaces.

use quick_links_adapters::{JsonLogger, StderrLogSink, TracingLogger};
use quick_links_ports::{LogLevel, LoggerPort};
use std::sync::Arc;

/// Output format for use-case events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Forward to the installed `tracing` subscriber.
    #[default]
    Tracing,
    /// One JSON object per line on stderr.
    Json,
}

/// Build the logger used by the use cases.
#[must_use]
pub fn build_logger(format: LogFormat, min_level: LogLevel) -> Arc<dyn LoggerPort> {
    match format {
        LogFormat::Tracing => Arc::new(TracingLogger::new()),
        LogFormat::Json => {
            Arc::new(JsonLogger::new(Arc::new(StderrLogSink)).with_min_level(min_level))
        },
    }
}
