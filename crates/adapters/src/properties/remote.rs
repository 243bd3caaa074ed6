//! Property source reading record properties from a CRM objects endpoint.

use crate::http::{HttpEndpointConfig, HttpService};
use quick_links_ports::{BoxFuture, PropertyRequest, PropertySourcePort, PropertyValues};
use quick_links_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::Deserialize;

/// `GET {baseUrl}/objects/{objectType}/{recordId}?properties=a,b`.
///
/// The response body is `{ "properties": { name: raw } }`; raw values may be
/// flat or `{value}`-wrapped depending on the CRM API version.
#[derive(Debug, Clone)]
pub struct HttpPropertySource {
    service: HttpService,
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    #[serde(default)]
    properties: PropertyValues,
}

impl HttpPropertySource {
    /// Build the source; fails on an unusable base URL or token.
    pub fn new(config: &HttpEndpointConfig) -> Result<Self> {
        Ok(Self {
            service: HttpService::new(config, "crm properties")?,
        })
    }

    async fn fetch_properties(
        &self,
        ctx: &RequestContext,
        request: PropertyRequest,
    ) -> Result<PropertyValues> {
        let Some(record_id) = request.record.record_id.as_ref() else {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "a record id is required to fetch properties",
            ));
        };
        if request.properties.is_empty() {
            return Ok(PropertyValues::new());
        }

        let mut url = self.service.url(&[
            "objects",
            request.record.object_type.as_str(),
            record_id.as_str(),
        ])?;
        let names: Vec<&str> = request.properties.iter().map(|name| name.as_str()).collect();
        url.query_pairs_mut()
            .append_pair("properties", &names.join(","));

        tracing::debug!(
            correlation_id = %ctx.correlation_id(),
            object_type = %request.record.object_type,
            property_count = names.len(),
            "fetching record properties"
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
        if !status.is_success() {
            return Err(self
                .service
                .map_http_error(status, &payload)
                .with_metadata("record_id", record_id.as_str()));
        }

        let decoded: ObjectResponse = serde_json::from_slice(&payload)
            .map_err(|error| self.service.invalid_response(&error))?;
        Ok(decoded.properties)
    }
}

impl PropertySourcePort for HttpPropertySource {
    fn source_name(&self) -> &'static str {
        "remote"
    }

    fn fetch(
        &self,
        ctx: &RequestContext,
        request: PropertyRequest,
    ) -> BoxFuture<'_, Result<PropertyValues>> {
        let ctx = ctx.clone();
        Box::pin(async move { self.fetch_properties(&ctx, request).await })
    }
}
