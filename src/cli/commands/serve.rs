//! HTTP API server.
//!
//! Exposes `POST /process-video`, `POST /ask-question` and a liveness `GET /`.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubeQaError;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Shared application state.
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Arc::new(Orchestrator::new(settings)?);
    let app = router(orchestrator);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("tubeqa API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Status", "GET  /");
    Output::kv("Process video", "POST /process-video");
    Output::kv("Ask question", "POST /ask-question");
    println!();
    Output::warning("CORS allows every origin. Restrict it before exposing this server.");
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Build the API router around an orchestrator.
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/process-video", post(process_video))
        .route("/ask-question", post(ask_question))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessRequest {
    video_url: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    video_id: String,
    message: String,
}

#[derive(Deserialize)]
struct AskRequest {
    video_id: String,
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

/// An error returned to HTTP clients as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<TubeQaError> for ApiError {
    fn from(err: TubeQaError) -> Self {
        let (status, detail) = match &err {
            TubeQaError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid YouTube URL".to_string()),
            TubeQaError::TranscriptUnavailable(_) => {
                (StatusCode::NOT_FOUND, "Could not fetch transcript".to_string())
            }
            TubeQaError::VectorStoreUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not create vector store".to_string(),
            ),
            TubeQaError::QaChainUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not create Q&A chain".to_string(),
            ),
            TubeQaError::SessionNotFound(_) => (
                StatusCode::NOT_FOUND,
                "Video not processed. Call /process-video first.".to_string(),
            ),
            TubeQaError::QueryFailed(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred: {}", cause),
            ),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        if status.is_server_error() {
            error!("{}", err);
        } else {
            warn!("{}", err);
        }

        Self { status, detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}

// === Handlers ===

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "YouTube Q&A Backend is running. Use the /process-video and /ask-question endpoints."
    }))
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let result = state.orchestrator.process_video(&req.video_url).await?;

    Ok(Json(ProcessResponse {
        message: result.message().to_string(),
        video_id: result.video_id,
    }))
}

async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let answer = state
        .orchestrator
        .ask_question(&req.video_id, &req.question)
        .await?;

    Ok(Json(AskResponse { answer }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::{harness, FakeTranscripts, Harness};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    struct TestApp {
        app: Router,
        transcripts: Arc<FakeTranscripts>,
        llm: Arc<crate::orchestrator::testing::FakeLlm>,
    }

    fn test_app(transcripts: FakeTranscripts) -> TestApp {
        let Harness {
            transcripts,
            llm,
            orchestrator,
            ..
        } = harness(transcripts);
        TestApp {
            app: router(Arc::new(orchestrator)),
            transcripts,
            llm,
        }
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_root() {
        let t = test_app(FakeTranscripts::default());

        let response = t
            .app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["message"],
            "YouTube Q&A Backend is running. Use the /process-video and /ask-question endpoints."
        );
    }

    #[tokio::test]
    async fn test_process_video_twice() {
        let t = test_app(FakeTranscripts::with("dQw4w9WgXcQ", "never gonna give you up"));
        let body = json!({ "video_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ" });

        let (status, json) = post(&t.app, "/process-video", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["video_id"], "dQw4w9WgXcQ");
        assert_eq!(json["message"], "Video processed successfully");

        let (status, json) = post(&t.app, "/process-video", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Video already processed");
        assert_eq!(t.transcripts.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_is_bad_request() {
        let t = test_app(FakeTranscripts::default());

        let (status, json) = post(&t.app, "/process-video", json!({ "video_url": "not a url" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Invalid YouTube URL");
        assert_eq!(t.transcripts.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_transcript_is_not_found() {
        let t = test_app(FakeTranscripts::default());

        let (status, json) = post(
            &t.app,
            "/process-video",
            json!({ "video_url": "https://youtu.be/nocaptions" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["detail"], "Could not fetch transcript");
    }

    #[tokio::test]
    async fn test_ask_before_process_is_not_found() {
        let t = test_app(FakeTranscripts::default());

        let (status, json) = post(
            &t.app,
            "/ask-question",
            json!({ "video_id": "abc", "question": "What happens?" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["detail"], "Video not processed. Call /process-video first.");
    }

    #[tokio::test]
    async fn test_process_then_ask() {
        let t = test_app(FakeTranscripts::with("abc", "a transcript"));

        let (status, _) = post(
            &t.app,
            "/process-video",
            json!({ "video_url": "https://www.youtube.com/embed/abc" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = post(
            &t.app,
            "/ask-question",
            json!({ "video_id": "abc", "question": "What is it about?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["answer"], "answer 1");
    }

    #[tokio::test]
    async fn test_query_failure_surfaces_cause() {
        let t = test_app(FakeTranscripts::with("abc", "a transcript"));
        post(&t.app, "/process-video", json!({ "video_url": "https://youtu.be/abc" })).await;
        t.llm.fail.store(true, Ordering::SeqCst);

        let (status, json) = post(
            &t.app,
            "/ask-question",
            json!({ "video_id": "abc", "question": "Why?" }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json["detail"].as_str().unwrap();
        assert!(detail.starts_with("An error occurred: "));
        assert!(detail.contains("upstream timed out"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let t = test_app(FakeTranscripts::default());

        let (status, _) = post(&t.app, "/process-video", json!({ "url": "missing field" })).await;
        assert!(status.is_client_error());
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (TubeQaError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (TubeQaError::TranscriptUnavailable("x".into()), StatusCode::NOT_FOUND),
            (TubeQaError::VectorStoreUnavailable("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (TubeQaError::QaChainUnavailable("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (TubeQaError::SessionNotFound("x".into()), StatusCode::NOT_FOUND),
            (TubeQaError::QueryFailed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }
}
