// Probe transport integration tests against a mock server.
#![allow(missing_docs)]

use results_portal_adapters::ReqwestProbeTransport;
use results_portal_ports::{ProbeRequest, ProbeTransportPort};
use results_portal_shared::{ErrorCode, RequestContext, Result};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_returns_status_and_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/validate"))
        .and(query_param("usn", "3VC24CD001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "student": { "usn": "3VC24CD001" }
        })))
        .mount(&server)
        .await;

    let transport = ReqwestProbeTransport::new(&server.uri(), 2_000)?;
    let ctx = RequestContext::new_request();
    let response = transport
        .get(&ctx, ProbeRequest::from("/api/validate?usn=3VC24CD001"))
        .await?;

    assert_eq!(response.status, 200);
    assert!(response.body.contains("\"ok\":true"));
    Ok(())
}

#[tokio::test]
async fn error_statuses_are_transport_successes() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/validate"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error": "No matching record found. Please verify your Name or USN and try again."
        })))
        .mount(&server)
        .await;

    let transport = ReqwestProbeTransport::new(&server.uri(), 2_000)?;
    let response = transport
        .get(&RequestContext::new_request(), ProbeRequest::from("/api/validate"))
        .await?;

    assert_eq!(response.status, 403);
    assert!(response.body.contains("No matching record"));
    Ok(())
}

#[tokio::test]
async fn slow_responses_time_out() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = ReqwestProbeTransport::new(&server.uri(), 100)?;
    let error = transport
        .get(&RequestContext::new_request(), ProbeRequest::from("/slow"))
        .await
        .err();

    assert_eq!(error.map(|error| error.code), Some(ErrorCode::timeout()));
    Ok(())
}
