//! Settings persistence boundary contract.

use crate::BoxFuture;
use quick_links_domain::{PortalId, SettingsDocument};
use quick_links_shared::{RequestContext, Result};

/// Loads and saves the settings document for one portal.
///
/// Remote HTTP, host-provided, and local file backends all implement this
/// trait and are interchangeable.
///
/// `load` returns the raw stored JSON so that callers can migrate historical
/// layouts; `Ok(None)` means nothing has been saved for the portal yet and is
/// not an error. `save` always writes the whole document. Failures are
/// returned as error envelopes whose message is the human-readable reason.
pub trait SettingsStorePort: Send + Sync {
    /// Short backend name for logs (`remote`, `host`, `local`).
    fn backend_name(&self) -> &'static str;

    /// Load the raw persisted document.
    fn load(
        &self,
        ctx: &RequestContext,
        portal_id: &PortalId,
    ) -> BoxFuture<'_, Result<Option<serde_json::Value>>>;

    /// Persist the whole document, replacing what was stored.
    fn save(
        &self,
        ctx: &RequestContext,
        portal_id: &PortalId,
        document: SettingsDocument,
    ) -> BoxFuture<'_, Result<()>>;
}
