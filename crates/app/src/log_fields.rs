//! Field builders shared by the use-case log events.

use quick_links_ports::{LogFields, RecordContext};
use quick_links_shared::ErrorEnvelope;
use serde_json::Value;
use std::time::Instant;

pub fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub fn insert(fields: &mut LogFields, key: &str, value: impl Into<Value>) {
    fields.insert(key.to_owned().into_boxed_str(), value.into());
}

pub fn portal(portal_id: &str) -> LogFields {
    let mut fields = LogFields::new();
    insert(&mut fields, "portalId", portal_id);
    fields
}

pub fn record(record: &RecordContext) -> LogFields {
    let mut fields = portal(record.portal_id.as_str());
    insert(&mut fields, "objectType", record.object_type.as_str());
    if let Some(record_id) = record.record_id.as_ref() {
        insert(&mut fields, "recordId", record_id.as_str());
    }
    fields
}

pub fn with_duration(mut fields: LogFields, started_at: Instant) -> LogFields {
    insert(&mut fields, "durationMs", duration_ms(started_at));
    fields
}

pub fn with_error(mut fields: LogFields, error: &ErrorEnvelope) -> LogFields {
    insert(&mut fields, "errorCode", error.code.to_string());
    insert(&mut fields, "error", error.to_string());
    fields
}
