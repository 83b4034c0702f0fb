//! HTTP probe transport boundary contract.

use crate::BoxFuture;
use results_portal_shared::{RequestContext, Result};

/// Owned request for a single probe GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    /// Path plus query string, e.g. `/api/validate?usn=3VC24CD001`.
    pub path_and_query: Box<str>,
}

impl From<&str> for ProbeRequest {
    fn from(path_and_query: &str) -> Self {
        Self {
            path_and_query: path_and_query.to_owned().into_boxed_str(),
        }
    }
}

/// Raw response captured by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: Box<str>,
}

/// Boundary contract for issuing probe requests against a running service.
///
/// Transport failures (connect, timeout) are returned as errors; any HTTP
/// status, including 4xx/5xx, is a successful transport result.
pub trait ProbeTransportPort: Send + Sync {
    /// Base URL the transport targets, for reporting.
    fn base_url(&self) -> &str;

    /// Issue a GET request.
    fn get(&self, ctx: &RequestContext, request: ProbeRequest)
    -> BoxFuture<'_, Result<ProbeResponse>>;
}
