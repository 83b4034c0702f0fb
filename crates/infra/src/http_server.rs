//! HTTP surface: axum router, handlers, and the graceful serve loop.

use crate::{InfraResult, PortalRuntime};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use results_portal_api::v1::{
    ApiV1DiagnosticsResponse, ApiV1DownloadQueryDto, ApiV1HealthDto, ApiV1LookupQueryDto,
    ApiV1LookupResponse, METHOD_NOT_ALLOWED_MESSAGE, STATUS_METHOD_NOT_ALLOWED,
    STUDENTS_LOAD_ERROR_MESSAGE, download_error_to_api_v1, download_request_from_api_v1,
    lookup_query_from_api_v1, lookup_result_to_api_v1, sample_student_to_api_v1,
    students_result_to_api_v1,
};
use flate2::Compression;
use flate2::write::GzEncoder;
use results_portal_app::{
    ExportedResult, dataset_diagnostics, export_result, list_students, lookup_student,
    now_epoch_ms,
};
use results_portal_shared::{
    CorrelationId, ErrorClass, ErrorCode, ErrorEnvelope, RequestContext,
};
use serde::Serialize;
use std::future::Future;
use std::io::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// `Access-Control-Allow-Methods` on the validation endpoint.
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
/// `Access-Control-Allow-Headers` on the validation endpoint.
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";
/// `Cache-Control` on the student list.
pub const STUDENTS_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";
/// Header carrying the caller's correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Failures while binding or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen socket could not be opened.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The accept loop stopped with an error.
    #[error("server stopped: {0}")]
    Serve(#[source] std::io::Error),
    /// The configured origin is not a valid header value.
    #[error("invalid allowed origin: {0}")]
    InvalidOrigin(String),
}

impl From<ServerError> for ErrorEnvelope {
    fn from(error: ServerError) -> Self {
        let message = error.to_string();
        match error {
            ServerError::Bind { addr, .. } => Self::unexpected(
                ErrorCode::new("server", "bind_failed"),
                message,
                ErrorClass::Retriable,
            )
            .with_metadata("addr", addr.to_string()),
            ServerError::Serve(_) => Self::unexpected(
                ErrorCode::new("server", "serve_failed"),
                message,
                ErrorClass::NonRetriable,
            ),
            ServerError::InvalidOrigin(_) => {
                Self::expected(ErrorCode::new("server", "invalid_origin"), message)
            },
        }
    }
}

struct ServerState {
    runtime: PortalRuntime,
    allowed_origin: HeaderValue,
}

impl ServerState {
    fn with_cors(&self, mut response: Response) -> Response {
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allowed_origin.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
        response
    }
}

/// Build the portal router over a composed runtime.
pub fn build_router(runtime: PortalRuntime) -> InfraResult<Router> {
    let origin = runtime.config().server.allowed_origin.to_string();
    let allowed_origin = HeaderValue::from_str(&origin)
        .map_err(|_| ServerError::InvalidOrigin(origin.clone()))?;
    let state = Arc::new(ServerState {
        runtime,
        allowed_origin,
    });

    Ok(Router::new()
        .route(
            "/api/validate",
            get(validate)
                .options(validate_preflight)
                .fallback(validate_method_not_allowed),
        )
        .route("/api/students", get(students))
        .route("/api/test-data", get(test_data))
        .route("/api/download", get(download))
        .route("/healthz", get(healthz))
        .with_state(state))
}

/// Open the listen socket.
pub async fn bind_listener(addr: SocketAddr) -> InfraResult<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    Ok(listener)
}

/// Serve the portal on `listener` until `shutdown` resolves.
#[tracing::instrument(name = "portal.serve", skip_all)]
pub async fn serve<F>(listener: TcpListener, runtime: PortalRuntime, shutdown: F) -> InfraResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let dataset = runtime.directory().info().label();
    let router = build_router(runtime)?;
    let addr = listener
        .local_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default();
    tracing::info!(target: "results_portal::http", %addr, %dataset, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!(target: "results_portal::http", "server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "results_portal::http", %error, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}

fn request_context(headers: &HeaderMap) -> RequestContext {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| CorrelationId::parse(value).ok())
        .map_or_else(RequestContext::new_request, RequestContext::new)
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn json_response<T: Serialize>(ctx: &RequestContext, status: u16, body: &T) -> Response {
    let mut response = (status_code(status), Json(body)).into_response();
    tag_request_id(ctx, &mut response);
    response
}

fn text_response(ctx: &RequestContext, status: u16, body: String) -> Response {
    let mut response = (
        status_code(status),
        [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
        body,
    )
        .into_response();
    tag_request_id(ctx, &mut response);
    response
}

fn tag_request_id(ctx: &RequestContext, response: &mut Response) {
    if let Ok(value) = HeaderValue::from_str(ctx.correlation_id().as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
}

fn log_request(ctx: &RequestContext, route: &'static str, status: u16) {
    tracing::info!(
        target: "results_portal::http",
        request_id = ctx.correlation_id().as_str(),
        route,
        status,
        "request handled"
    );
}

async fn validate(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    query: Result<Query<ApiV1LookupQueryDto>, QueryRejection>,
) -> Response {
    let ctx = request_context(&headers);
    let dto = query.map(|Query(dto)| dto).unwrap_or_default();
    let lookup = lookup_query_from_api_v1(dto);
    let result = lookup_student(&ctx, &state.runtime.lookup_deps(&ctx), &lookup).await;
    let reply = lookup_result_to_api_v1(&result);

    log_request(&ctx, "/api/validate", reply.status);
    state.with_cors(json_response(&ctx, reply.status, &reply.body))
}

async fn validate_preflight(State(state): State<Arc<ServerState>>) -> Response {
    state.with_cors(StatusCode::OK.into_response())
}

async fn validate_method_not_allowed(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Response {
    let ctx = request_context(&headers);
    log_request(&ctx, "/api/validate", STATUS_METHOD_NOT_ALLOWED);
    let body = ApiV1LookupResponse::rejected(METHOD_NOT_ALLOWED_MESSAGE);
    let mut response = json_response(&ctx, STATUS_METHOD_NOT_ALLOWED, &body);
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, OPTIONS"));
    state.with_cors(response)
}

async fn students(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let ctx = request_context(&headers);
    let result = list_students(&ctx, &state.runtime.list_deps(&ctx)).await;
    let reply = students_result_to_api_v1(&result);

    log_request(&ctx, "/api/students", reply.status);
    match reply.body {
        Ok(students) => {
            let mut response = json_response(&ctx, reply.status, &students);
            response.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(STUDENTS_CACHE_CONTROL),
            );
            response
        },
        Err(error) => json_response(&ctx, reply.status, &error),
    }
}

async fn test_data(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let ctx = request_context(&headers);
    let environment = state.runtime.config().server.environment.to_string();
    let result = dataset_diagnostics(&ctx, &state.runtime.list_deps(&ctx), &environment).await;

    let (status, body) = match result {
        Ok(diagnostics) => (
            StatusCode::OK,
            ApiV1DiagnosticsResponse::Loaded {
                success: true,
                students_count: diagnostics.students_count,
                load_time: format!("{}ms", diagnostics.load_time_ms),
                environment,
                timestamp_ms: diagnostics.timestamp_ms,
                dataset_source: diagnostics.dataset_source,
                sample_student: diagnostics
                    .sample
                    .as_deref()
                    .map(sample_student_to_api_v1),
            },
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiV1DiagnosticsResponse::Failed {
                success: false,
                error: STUDENTS_LOAD_ERROR_MESSAGE.to_owned(),
                environment,
                timestamp_ms: now_epoch_ms(),
            },
        ),
    };

    log_request(&ctx, "/api/test-data", status.as_u16());
    json_response(&ctx, status.as_u16(), &body)
}

async fn download(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    query: Result<Query<ApiV1DownloadQueryDto>, QueryRejection>,
) -> Response {
    let ctx = request_context(&headers);
    let dto = query.map(|Query(dto)| dto).unwrap_or_default();

    let result = match download_request_from_api_v1(dto) {
        Ok(request) => {
            export_result(
                &ctx,
                &state.runtime.export_deps(&ctx),
                &request.query,
                &request.options,
            )
            .await
        },
        Err(error) => Err(ErrorEnvelope::from(error)),
    };
    let result = match result {
        Ok(exported) if exported.compress => gzip(&exported.body)
            .map(|body| (ExportedResult { body, ..exported }, true))
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("export", "compress_failed"),
                    format!("failed to gzip export: {error}"),
                    ErrorClass::NonRetriable,
                )
            }),
        Ok(exported) => Ok((exported, false)),
        Err(error) => Err(error),
    };

    match result {
        Ok((exported, gzipped)) => {
            log_request(&ctx, "/api/download", StatusCode::OK.as_u16());
            let mut response = (
                StatusCode::OK,
                [(header::CONTENT_TYPE, exported.content_type)],
                exported.body,
            )
                .into_response();
            let headers = response.headers_mut();
            let disposition = format!("attachment; filename=\"{}\"", exported.file_name);
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
            if gzipped {
                headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            }
            tag_request_id(&ctx, &mut response);
            response
        },
        Err(error) => {
            let reply = download_error_to_api_v1(&error);
            log_request(&ctx, "/api/download", reply.status);
            text_response(&ctx, reply.status, reply.body)
        },
    }
}

fn gzip(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

async fn healthz(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let ctx = request_context(&headers);
    let (status, body) = match state.runtime.directory().list_students(&ctx).await {
        Ok(records) => (
            StatusCode::OK,
            ApiV1HealthDto {
                status: "ok".to_owned(),
                students_count: Some(records.len()),
            },
        ),
        Err(error) => {
            tracing::error!(
                target: "results_portal::http",
                request_id = ctx.correlation_id().as_str(),
                code = %error.code,
                "health check failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiV1HealthDto {
                    status: "error".to_owned(),
                    students_count: None,
                },
            )
        },
    };
    json_response(&ctx, status.as_u16(), &body)
}
