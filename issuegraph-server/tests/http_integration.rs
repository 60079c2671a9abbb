//! HTTP integration tests for the issue graph server
//!
//! Router tests go through Axum `oneshot` for full handler dispatch; the last test
//! binds a real listener to check the bytes that leave the socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use issuegraph_core::{render_dot, DemoSource, IssueGraphConfig, IssueType, JsonFileSource};
use issuegraph_server::http::{build_router, serve, HttpState, BAD_ENDPOINT_MESSAGE};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

/// Static root holding an index page and one plain file
fn static_root() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>viewer</html>").unwrap();
    std::fs::write(dir.path().join("hello.txt"), "hello from disk").unwrap();
    std::fs::create_dir(dir.path().join("api")).unwrap();
    std::fs::write(dir.path().join("api").join("-notes.txt"), "static under api").unwrap();
    dir
}

/// The viewer shipped at the workspace root
fn shipped_www() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("www")
}

fn make_http_state(root: &TempDir) -> Arc<HttpState> {
    let mut config = IssueGraphConfig::default();
    config.server.static_root = root.path().to_string_lossy().into_owned();
    config.server.open_browser = false;
    Arc::new(HttpState {
        config,
        source: Arc::new(DemoSource),
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

// ===========================================================================
// TEST 1: /api/search without a query string returns the empty graph
// ===========================================================================
#[tokio::test]
async fn test_search_without_query_is_empty_graph() {
    let root = static_root();
    let app = build_router(make_http_state(&root));

    let (status, headers, body) = get(app, "/api/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body, render_dot(&[]).unwrap());
}

// ===========================================================================
// TEST 2: absent and blank search parameters are equivalent
// ===========================================================================
#[tokio::test]
async fn test_search_blank_equals_absent() {
    let root = static_root();
    let state = make_http_state(&root);

    let (_, _, absent) = get(build_router(state.clone()), "/api/search").await;
    let (status, _, blank) = get(build_router(state), "/api/search?search=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(absent, blank);
}

// ===========================================================================
// TEST 3: any non-empty search returns the demo graph, byte-identical
// ===========================================================================
#[tokio::test]
async fn test_search_returns_demo_graph() {
    let root = static_root();
    let state = make_http_state(&root);

    let (status, headers, first) =
        get(build_router(state.clone()), "/api/search?search=anything").await;
    let (_, _, second) = get(
        build_router(state),
        "/api/search?search=something%20else%20%22quoted%22",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(
        headers[header::CONTENT_LENGTH],
        first.len().to_string().as_str()
    );

    for key in [
        "PROJ_123[label=\"PROJ-123\"",
        "PROJ_456[label=\"PROJ-456\"",
        "ITEM_789[label=\"ITEM-789\"",
        "ITEM_111[label=\"ITEM-111\"",
        "ITEM_432[label=\"ITEM-432\"",
        "ITEM_212[label=\"ITEM-212\"",
        "WORK_212[label=\"WORK-212\"",
        "WORK_454[label=\"WORK-454\"",
    ] {
        assert!(first.contains(key), "missing node line for {}", key);
    }
    assert!(first.contains("PROJ_123 -> ITEM_789[title=\"Relates to...\"]"));
    assert!(first.contains("ITEM_432 -> ITEM_212[title=\"Relates to...\"]"));
    assert_eq!(first.matches("title=\"blah\" hidden=\"true\"").count(), 3);
    assert_eq!(first.matches("title=\"stuff\" hidden=\"true\"").count(), 1);
}

// ===========================================================================
// TEST 4: unknown API endpoints are rejected with 400
// ===========================================================================
#[tokio::test]
async fn test_unknown_api_endpoint_is_bad_request() {
    let root = static_root();
    let state = make_http_state(&root);

    for uri in ["/api/unknown", "/api/searches", "/api/unknown/search?search=x"] {
        let (status, _, body) = get(build_router(state.clone()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(body, BAD_ENDPOINT_MESSAGE);
    }
}

// ===========================================================================
// TEST 5: the word run after /api/ picks the endpoint; the rest is ignored
// ===========================================================================
#[tokio::test]
async fn test_search_endpoint_matches_leading_word() {
    let root = static_root();
    let state = make_http_state(&root);

    let (_, _, expected) = get(build_router(state.clone()), "/api/search?search=x").await;
    for uri in [
        "/api/search/?search=x",
        "/api/search/extra?search=x",
        "/api/search.txt?search=x",
    ] {
        let (status, headers, body) = get(build_router(state.clone()), uri).await;
        assert_eq!(status, StatusCode::OK, "uri {}", uri);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body, expected, "uri {}", uri);
    }

    let (status, _, body) = get(build_router(state), "/api/search/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, render_dot(&[]).unwrap());
}

// ===========================================================================
// TEST 6: /api/ paths without a leading word fall through to static files
// ===========================================================================
#[tokio::test]
async fn test_api_without_word_is_static() {
    let root = static_root();
    let state = make_http_state(&root);

    let (status, _, _) = get(build_router(state.clone()), "/api/-x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = get(build_router(state), "/api/-notes.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "static under api");
}

// ===========================================================================
// TEST 7: other paths are served from the static root
// ===========================================================================
#[tokio::test]
async fn test_static_files_served() {
    let root = static_root();
    let state = make_http_state(&root);

    let (status, _, body) = get(build_router(state.clone()), "/hello.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello from disk");

    let (status, _, body) = get(build_router(state.clone()), "/?search=abc").await;
    assert_eq!(status, StatusCode::OK, "directory should serve index.html");
    assert_eq!(body, "<html>viewer</html>");

    let (status, _, _) = get(build_router(state), "/missing.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ===========================================================================
// TEST 8: a file-backed source is rendered through the same endpoint
// ===========================================================================
#[tokio::test]
async fn test_search_with_file_source() {
    let root = static_root();
    let data = root.path().join("issues.json");
    std::fs::write(
        &data,
        r#"[{"key": "A-1", "summary": "say \"hi\"", "type": "epic"}]"#,
    )
    .unwrap();

    let mut config = IssueGraphConfig::default();
    config.server.static_root = root.path().to_string_lossy().into_owned();
    let state = Arc::new(HttpState {
        config,
        source: Arc::new(JsonFileSource::load(&data).unwrap()),
    });

    let (status, _, body) = get(build_router(state), "/api/search?search=x").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"A_1[label="A-1" title="say \"hi\"" image="img/epic.png"]"#));
}

// ===========================================================================
// TEST 9: real socket: headers on the wire and graceful shutdown
// ===========================================================================
#[tokio::test]
async fn test_serve_over_tcp() {
    let root = static_root();
    let state = make_http_state(&root);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, state, async move {
        let _ = stop_rx.await;
    }));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/search?search=x HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let head = head.to_ascii_lowercase();
    assert!(head.starts_with("http/1.1 200"));
    assert!(head.contains("content-type: text/plain\r\n"));
    assert!(head.contains(&format!("content-length: {}", body.len())));
    assert!(body.starts_with("digraph {\n/* Nodes */\nPROJ_123"));

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

// ===========================================================================
// TEST 10: the shipped viewer has an image for every node icon
// ===========================================================================
#[tokio::test]
async fn test_shipped_viewer_serves_icons() {
    let mut config = IssueGraphConfig::default();
    config.server.static_root = shipped_www().to_string_lossy().into_owned();
    let state = Arc::new(HttpState {
        config,
        source: Arc::new(DemoSource),
    });

    for issue_type in [
        IssueType::Epic,
        IssueType::Spike,
        IssueType::Story,
        IssueType::Bug,
        IssueType::Task,
        IssueType::Other,
    ] {
        let uri = format!("/{}", issue_type.icon());
        let req = Request::builder().uri(&uri).body(Body::empty()).unwrap();
        let resp = build_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "missing icon {}", uri);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{} is not a PNG", uri);
    }

    let (status, _, body) = get(build_router(state), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/search?"));
}
