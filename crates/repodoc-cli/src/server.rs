//! HTTP server: web UI and the generate endpoint

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use repodoc::{DocError, DocGenerator, ErrorResponse, GenerateResponse};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Single-page client
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared state for all handlers
struct AppState {
    generator: DocGenerator,
}

/// Relay-layer error: a [`DocError`] rendered as `{"error": ...}`
struct ApiError(DocError);

impl From<DocError> for ApiError {
    fn from(err: DocError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_client_error() {
            warn!(status = status.as_u16(), error = %self.0, "Rejected generate request");
        } else {
            error!(status = status.as_u16(), error = %self.0, "Generate request failed");
        }

        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// GET /health response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Build the application router
pub fn router(generator: DocGenerator) -> Router {
    let state = Arc::new(AppState { generator });

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn run_server(bind: SocketAddr, generator: DocGenerator) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("RepoDoc listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(generator))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/generate
///
/// The body is parsed as JSON regardless of `Content-Type`. A body that is not
/// JSON at all is an unexpected failure (500), not a validation error.
async fn generate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| DocError::Unexpected(e.to_string()))?;

    let text = state.generator.generate(&payload).await?;
    Ok(Json(GenerateResponse { text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use repodoc::{
        CompletionClient, GenerateRequest, MetadataSource, RepoMetadata, RepositoryReference,
        MISSING_README,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl MetadataSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch(&self, _repo: &RepositoryReference) -> Result<RepoMetadata, DocError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DocError::UpstreamFetch {
                    resource: "README",
                    status: 404,
                });
            }
            Ok(RepoMetadata {
                readme: MISSING_README.to_string(),
                file_list: "a.ts\nb.ts".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct StubCompletion {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for StubCompletion {
        fn model(&self) -> &str {
            "stub-model"
        }

        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, DocError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("# Docs ({} prompt bytes)", prompt.len()))
        }
    }

    fn app(source: Arc<StubSource>, completion: Arc<StubCompletion>) -> Router {
        router(DocGenerator::new(source, completion))
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn generate_body(link: &str) -> String {
        serde_json::to_string(&GenerateRequest::new(link)).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_ok() {
        let source = Arc::new(StubSource::default());
        let completion = Arc::new(StubCompletion::default());

        let response = app(source.clone(), completion.clone())
            .oneshot(post_json(&generate_body("https://github.com/acme/widgets")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["text"].as_str().unwrap().starts_with("# Docs"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_invalid_link() {
        let source = Arc::new(StubSource::default());
        let completion = Arc::new(StubCompletion::default());

        for body in [
            r#"{"repoLink":"not-a-url"}"#,
            r#"{"repoLink":42}"#,
            r#"{}"#,
            r#"null"#,
        ] {
            let response = app(source.clone(), completion.clone())
                .oneshot(post_json(body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(
                body_json(response).await,
                serde_json::json!({ "error": "Invalid GitHub repository URL." })
            );
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_without_content_type() {
        let source = Arc::new(StubSource::default());
        let completion = Arc::new(StubCompletion::default());

        let request = Request::builder()
            .method("POST")
            .uri("/api/generate")
            .body(Body::from(generate_body("https://github.com/acme/widgets")))
            .unwrap();
        let response = app(source.clone(), completion.clone())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["text"].as_str().unwrap().starts_with("# Docs"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let source = Arc::new(StubSource::default());
        let completion = Arc::new(StubCompletion::default());

        for body in ["{bad", "not json", ""] {
            let response = app(source.clone(), completion.clone())
                .oneshot(post_json(body))
                .await
                .unwrap();

            assert_eq!(
                response.status(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "body: {:?}",
                body
            );
            let error = body_json(response).await["error"]
                .as_str()
                .unwrap()
                .to_string();
            assert!(error.starts_with("Unexpected error: "), "error: {}", error);
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_upstream_failure() {
        let source = Arc::new(StubSource {
            fail: true,
            ..Default::default()
        });
        let completion = Arc::new(StubCompletion::default());

        let response = app(source, completion.clone())
            .oneshot(post_json(&generate_body("https://github.com/acme/widgets")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "GitHub README fetch failed: 404" })
        );
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Default::default(), Default::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_index_serves_ui() {
        let response = app(Default::default(), Default::default())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/generate"));
        // attribute quotes in model output must not break out of generated links
        assert!(html.contains(r#".replace(/"/g, "&quot;")"#));
        assert!(html.contains(r#".replace(/'/g, "&#39;")"#));
    }
}
