//! Issue graph HTTP server
//!
//! Axum-based HTTP server that answers graph queries and serves the static viewer.
//!
//! Architecture: each API endpoint has a thin axum handler that delegates to a pure
//! inner function. The inner functions are directly testable without axum dispatch.
//!
//! Endpoints (only the leading run of word characters after `/api/` names the endpoint):
//! - GET /api/search?search=<text>  DOT graph text for the query (also /api/search/..., /api/search.txt)
//! - GET /api/<other word>          400, points callers at the search endpoint
//! - GET /api/<non-word>...         static file, same as any other path
//! - GET /<anything else>           static file under the configured root

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use issuegraph_core::{render_dot, IssueGraphConfig, IssueGraphError, IssueSource};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub const BAD_ENDPOINT_MESSAGE: &str = "Please use search endpoint";

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub config: IssueGraphConfig,
    pub source: Arc<dyn IssueSource>,
}

/// Where an `/api/...` request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRoute {
    Search,
    Unknown(String),
    /// No endpoint name after `/api/`; handled like any other path.
    Static,
}

/// Build the Axum router: `/api/*` first, static files for everything else
pub fn build_router(state: Arc<HttpState>) -> Router {
    let files = ServeDir::new(&state.config.server.static_root);

    Router::new()
        .route("/api/*endpoint", get(api_handler))
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` resolves.
/// Callers bind first so the real port is known before the browser is opened.
pub async fn serve<F>(listener: TcpListener, state: Arc<HttpState>, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let port = listener.local_addr()?.port();
    tracing::info!(
        source = state.source.name(),
        static_root = %state.config.server.static_root,
        "Running at port {}",
        port
    );

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Route on the leading `[A-Za-z0-9_]` run of the path after `/api/`.
/// Anything after that run (`/extra`, `.txt`, ...) is ignored.
pub fn api_route(tail: &str) -> ApiRoute {
    let end = tail
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(tail.len());
    match &tail[..end] {
        "" => ApiRoute::Static,
        "search" => ApiRoute::Search,
        other => ApiRoute::Unknown(other.to_string()),
    }
}

/// First non-empty `search` value. Blank values count as absent.
pub fn search_term(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, value)| key == "search" && !value.is_empty())
        .map(|(_, value)| value.as_str())
}

/// Inner search: picks the issues for the query and renders them.
///
/// No search term renders an empty graph without consulting the source.
pub fn search_inner(
    source: &dyn IssueSource,
    params: &[(String, String)],
) -> (StatusCode, String) {
    match render_search(source, search_term(params)) {
        Ok(dot) => (StatusCode::OK, dot),
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn render_search(source: &dyn IssueSource, term: Option<&str>) -> Result<String, IssueGraphError> {
    let issues = match term {
        Some(term) => source.search(term)?,
        None => Vec::new(),
    };
    Ok(render_dot(&issues)?)
}

/// Inner unknown endpoint: every `/api/*` path other than `search`.
pub fn unknown_endpoint_inner(endpoint: &str) -> (StatusCode, &'static str) {
    tracing::warn!(endpoint, "Rejected unknown API endpoint");
    (StatusCode::BAD_REQUEST, BAD_ENDPOINT_MESSAGE)
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

/// Every `/api/*` request. The raw (still percent-encoded) path decides the route.
pub async fn api_handler(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<Vec<(String, String)>>,
    req: Request,
) -> Response {
    let tail = req.uri().path().strip_prefix("/api/").unwrap_or_default();
    match api_route(tail) {
        ApiRoute::Search => search_response(state.source.as_ref(), &params),
        ApiRoute::Unknown(endpoint) => unknown_endpoint_inner(&endpoint).into_response(),
        ApiRoute::Static => serve_static(&state.config.server.static_root, req).await,
    }
}

fn search_response(source: &dyn IssueSource, params: &[(String, String)]) -> Response {
    let (status, body) = search_inner(source, params);
    (
        status,
        [
            (header::CONTENT_TYPE, "text/plain".to_string()),
            (header::CONTENT_LENGTH, body.len().to_string()),
        ],
        body,
    )
        .into_response()
}

async fn serve_static(root: &str, req: Request) -> Response {
    match ServeDir::new(root).oneshot(req).await {
        Ok(resp) => resp.into_response(),
        Err(never) => match never {},
    }
}

// ============================================================================
// Unit Tests: call inner functions directly
// ============================================================================
