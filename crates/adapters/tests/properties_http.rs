// HTTP property source integration tests.
#![allow(missing_docs)]

use quick_links_adapters::{HttpEndpointConfig, HttpPropertySource};
use quick_links_domain::{ObjectType, PortalId, PropertyName, RecordId};
use quick_links_ports::{PropertyRequest, PropertySourcePort, RecordContext};
use quick_links_shared::{ErrorCode, RequestContext, Result};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> Result<HttpPropertySource> {
    HttpPropertySource::new(&HttpEndpointConfig {
        base_url: format!("{}/crm/v3", server.uri()).into(),
        timeout_ms: 5_000,
        api_token: None,
    })
}

fn request(record_id: Option<&str>, names: &[&str]) -> Result<PropertyRequest> {
    Ok(PropertyRequest {
        record: RecordContext {
            portal_id: PortalId::parse("4242")?,
            object_type: ObjectType::parse("COMPANY")?,
            record_id: record_id.map(RecordId::parse).transpose()?,
        },
        properties: names
            .iter()
            .map(|name| PropertyName::parse(name))
            .collect::<std::result::Result<_, _>>()?,
    })
}

#[tokio::test]
async fn fetches_requested_properties_for_the_record() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crm/v3/objects/COMPANY/901"))
        .and(query_param("properties", "company_name,website"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "901",
            "properties": {
                "website": "acme.example",
                "company_name": { "value": "Acme" }
            }
        })))
        .mount(&server)
        .await;

    let values = source(&server)?
        .fetch(
            &RequestContext::new_request(),
            request(Some("901"), &["website", "company_name"])?,
        )
        .await?;
    assert_eq!(values.get("website"), Some(&json!("acme.example")));
    assert_eq!(values.get("company_name"), Some(&json!({ "value": "Acme" })));
    Ok(())
}

#[tokio::test]
async fn missing_record_id_is_invalid_input() -> Result<()> {
    let server = MockServer::start().await;
    let error = source(&server)?
        .fetch(&RequestContext::new_request(), request(None, &["website"])?)
        .await
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid input"))?;
    assert_eq!(error.code, ErrorCode::invalid_input());
    Ok(())
}

#[tokio::test]
async fn server_errors_surface_as_fetch_failures() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crm/v3/objects/COMPANY/901"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let error = source(&server)?
        .fetch(&RequestContext::new_request(), request(Some("901"), &["website"])?)
        .await
        .err()
        .ok_or_else(|| std::io::Error::other("expected fetch failure"))?;
    assert_eq!(error.code, ErrorCode::dependency_unavailable());
    assert_eq!(error.metadata.get("record_id").map(String::as_str), Some("901"));
    Ok(())
}
