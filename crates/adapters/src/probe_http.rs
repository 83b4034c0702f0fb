//! Reqwest-backed probe transport.

use results_portal_ports::{BoxFuture, ProbeRequest, ProbeResponse, ProbeTransportPort};
use results_portal_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::time::Duration;

/// HTTP transport that issues probe requests against a base URL.
#[derive(Debug, Clone)]
pub struct ReqwestProbeTransport {
    client: reqwest::Client,
    base_url: Box<str>,
}

impl ReqwestProbeTransport {
    /// Create a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "probe base url must be non-empty",
            ));
        }
        if timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "probe timeout must be greater than zero",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("probe", "client_init_failed"),
                    format!("failed to build probe client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url_for(&self, request: &ProbeRequest) -> String {
        let path = request.path_and_query.as_ref();
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl ProbeTransportPort for ReqwestProbeTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(
        &self,
        ctx: &RequestContext,
        request: ProbeRequest,
    ) -> BoxFuture<'_, Result<ProbeResponse>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            const OPERATION: &str = "probe.get";
            ctx.ensure_not_cancelled(OPERATION)?;
            let url = self.url_for(&request);

            let response = tokio::select! {
                () = ctx.cancelled() => return Err(cancelled_error(OPERATION)),
                result = self.client.get(&url).send() => {
                    result.map_err(|error| map_reqwest_error(&error))?
                }
            };

            let status = response.status().as_u16();
            let body = tokio::select! {
                () = ctx.cancelled() => return Err(cancelled_error(OPERATION)),
                result = response.text() => result.map_err(|error| map_reqwest_error(&error))?,
            };

            Ok(ProbeResponse {
                status,
                body: body.into_boxed_str(),
            })
        })
    }
}

fn cancelled_error(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            "probe request timed out",
            ErrorClass::Retriable,
        );
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("probe connection failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new("probe", "request_failed"),
        format!("probe request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}
