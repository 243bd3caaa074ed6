//! Settings store backed by a remote HTTP endpoint keyed by portal id.

use crate::http::{HttpEndpointConfig, HttpService};
use quick_links_ports::{BoxFuture, PortalId, SettingsDocument, SettingsStorePort};
use quick_links_shared::{ErrorEnvelope, RequestContext, Result};
use reqwest::StatusCode;

/// `GET`/`PUT {baseUrl}/settings/{portalId}`.
///
/// A 404 on load means nothing has been saved yet.
#[derive(Debug, Clone)]
pub struct HttpSettingsStore {
    service: HttpService,
}

impl HttpSettingsStore {
    /// Build the store; fails on an unusable base URL or token.
    pub fn new(config: &HttpEndpointConfig) -> Result<Self> {
        Ok(Self {
            service: HttpService::new(config, "settings service")?,
        })
    }

    async fn load_document(
        &self,
        ctx: &RequestContext,
        portal_id: &PortalId,
    ) -> Result<Option<serde_json::Value>> {
        let url = self.service.url(&["settings", portal_id.as_str()])?;
        tracing::debug!(
            correlation_id = %ctx.correlation_id(),
            portal_id = %portal_id,
            "loading settings over http"
        );

        let response = self
            .service
            .client()
            .get(url)
            .send()
            .await
            .map_err(|error| self.service.map_reqwest_error(&error))?;
        let status = response.status();
        let payload = response
            .bytes()
            .await
            .map_err(|error| self.service.map_reqwest_error(&error))?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(self.portal_error(status, &payload, portal_id));
        }
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        // Same rule as the file stores: undecodable content goes to the
        // migrator as a string and ends up as the defaults.
        Ok(Some(serde_json::from_slice(&payload).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&payload).into_owned())
        })))
    }

    async fn save_document(
        &self,
        ctx: &RequestContext,
        portal_id: &PortalId,
        document: &SettingsDocument,
    ) -> Result<()> {
        let url = self.service.url(&["settings", portal_id.as_str()])?;
        tracing::debug!(
            correlation_id = %ctx.correlation_id(),
            portal_id = %portal_id,
            contact_buttons = document.contact_buttons.len(),
            company_buttons = document.company_buttons.len(),
            "saving settings over http"
        );

        let response = self
            .service
            .client()
            .put(url)
            .json(document)
            .send()
            .await
            .map_err(|error| self.service.map_reqwest_error(&error))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let payload = response
            .bytes()
            .await
            .map_err(|error| self.service.map_reqwest_error(&error))?;
        Err(self.portal_error(status, &payload, portal_id))
    }

    fn portal_error(&self, status: StatusCode, payload: &[u8], portal_id: &PortalId) -> ErrorEnvelope {
        self.service
            .map_http_error(status, payload)
            .with_metadata("portal_id", portal_id.as_str())
    }
}

impl SettingsStorePort for HttpSettingsStore {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    fn load(
        &self,
        ctx: &RequestContext,
        portal_id: &PortalId,
    ) -> BoxFuture<'_, Result<Option<serde_json::Value>>> {
        let ctx = ctx.clone();
        let portal_id = portal_id.clone();
        Box::pin(async move { self.load_document(&ctx, &portal_id).await })
    }

    fn save(
        &self,
        ctx: &RequestContext,
        portal_id: &PortalId,
        document: SettingsDocument,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        let portal_id = portal_id.clone();
        Box::pin(async move { self.save_document(&ctx, &portal_id, &document).await })
    }
}
