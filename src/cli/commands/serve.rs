//! HTTP API server over a single shared session.
//!
//! The session is guarded by a mutex, so concurrent requests are
//! serialized; the session itself stays strictly sequential.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvarError;
use crate::session::Session;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    session: Mutex<Session>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let session = Session::from_settings(&settings)?;

    let state = Arc::new(AppState {
        session: Mutex::new(session),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/ask", post(ask))
        .route("/forget", post(forget))
        .route("/status", get(status))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /ingest");
    Output::kv("Ask", "POST /ask");
    Output::kv("Forget", "POST /forget");
    Output::kv("Status", "GET  /status");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct IngestRequest {
    /// YouTube video URL.
    #[serde(default)]
    url: Option<String>,
    /// Channel id; mutually exclusive with `url`.
    #[serde(default)]
    channel_id: Option<String>,
    /// Maximum channel videos to load.
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct IngestResponse {
    success: bool,
    video: String,
    chunks_indexed: usize,
    videos_loaded: usize,
    videos_failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskApiResponse {
    answer: String,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    position: usize,
    score: f32,
    content: String,
}

#[derive(Serialize)]
struct StatusResponse {
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<String>,
    chunks: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Invalid input and missing-video errors are the caller's fault; the rest
/// are ours.
fn error_status(error: &SvarError) -> StatusCode {
    match error {
        SvarError::InvalidInput(_) | SvarError::NoVideoLoaded => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    let result = match (&req.url, &req.channel_id) {
        (Some(url), None) => session.ingest(url).await,
        (None, Some(channel_id)) => {
            let limit = req.limit.unwrap_or(50);
            session.ingest_channel(channel_id, limit).await
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Provide exactly one of 'url' or 'channel_id'".to_string(),
                }),
            )
                .into_response()
        }
    };

    match result {
        Ok(report) => Json(IngestResponse {
            success: true,
            video: report.video_ref.to_string(),
            chunks_indexed: report.chunks_indexed,
            videos_loaded: report.videos_loaded,
            videos_failed: report.videos_failed,
            error: None,
        })
        .into_response(),
        Err(e) => (
            error_status(&e),
            Json(IngestResponse {
                success: false,
                video: String::new(),
                chunks_indexed: 0,
                videos_loaded: 0,
                videos_failed: 0,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let session = state.session.lock().await;

    match session.ask(&req.question).await {
        Ok(response) => Json(AskApiResponse {
            answer: response.answer,
            sources: response
                .sources
                .into_iter()
                .enumerate()
                .map(|(i, s)| SourceInfo {
                    position: i + 1,
                    score: s.score,
                    content: s.chunk.content,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => (
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn forget(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    session.forget();
    Json(serde_json::json!({ "success": true }))
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(StatusResponse {
        loaded: session.is_loaded(),
        video: session.current_video().map(|v| v.to_string()),
        chunks: session.chunk_count(),
    })
}
