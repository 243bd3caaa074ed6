//! Record property boundary contract.

use crate::BoxFuture;
use quick_links_domain::{ObjectType, PortalId, PropertyName, PropertyValues, RecordId};
use quick_links_shared::{RequestContext, Result};
use std::collections::BTreeSet;

/// The record being viewed, as supplied by the CRM host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    /// Tenant identity; also the settings persistence key.
    pub portal_id: PortalId,
    /// Object type of the record (selects the button scope).
    pub object_type: ObjectType,
    /// Record identifier, when the host provides one.
    pub record_id: Option<RecordId>,
}

/// Properties to read for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRequest {
    /// Record to read from.
    pub record: RecordContext,
    /// Property names; never empty when sent to a source.
    pub properties: BTreeSet<PropertyName>,
}

/// Fetches record property values.
///
/// Returned values may be flat scalars or `{ "value": ... }` wrappers;
/// properties the record does not have may be absent from the map.
pub trait PropertySourcePort: Send + Sync {
    /// Short source name for logs.
    fn source_name(&self) -> &'static str;

    /// Fetch the requested properties.
    fn fetch(
        &self,
        ctx: &RequestContext,
        request: PropertyRequest,
    ) -> BoxFuture<'_, Result<PropertyValues>>;
}
