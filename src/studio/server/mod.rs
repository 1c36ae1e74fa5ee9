// SPDX-License-Identifier: MIT

//! HTTP API: health, streaming content creation and text analysis

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::adk::agent::AgentEvent;
use crate::adk::error::StudioError;
use crate::adk::state::StateKey;
use crate::studio::config::StudioConfig;
use crate::studio::pipeline::{ContentBrief, Studio};

const PREVIEW_CHARS: usize = 200;
const RUNNING_MESSAGE: &str = "Content Creation Studio API is running";

#[derive(Clone)]
pub struct AppState {
    /// `None` when no model credential is configured
    pub studio: Option<Arc<Studio>>,
    pub config: Arc<StudioConfig>,
}

impl AppState {
    pub fn new(studio: Option<Arc<Studio>>, config: StudioConfig) -> Self {
        Self {
            studio,
            config: Arc::new(config),
        }
    }

    fn require_studio(&self) -> Result<Arc<Studio>, ApiError> {
        self.studio.clone().ok_or_else(|| {
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Model not configured. Set the GOOGLE_API_KEY environment variable.",
            )
        })
    }
}

/// Error body returned as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<StudioError> for ApiError {
    fn from(e: StudioError) -> Self {
        log::error!("Request failed: {}", e);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// One `data:` line of the content creation stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    Status {
        message: String,
        session_id: String,
    },
    Event {
        author: String,
        kind: String,
        content_preview: String,
    },
    Chunk {
        content: String,
        author: String,
        session_id: String,
    },
    Complete {
        content: String,
        session_id: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    #[serde(flatten)]
    pub brief: ContentBrief,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/create-content", post(create_content))
        .route("/api/analyze-text", post(analyze_text));

    let assets = state.config.static_dir.join("assets");
    if assets.is_dir() {
        log::info!("Serving frontend assets from {}", assets.display());
        app = app.nest_service("/assets", ServeDir::new(assets));
    }

    let cors = cors_layer(&state.config.allowed_origins);

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub async fn serve(state: AppState) -> Result<(), StudioError> {
    let addr = state.config.bind_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn status_body(state: &AppState) -> Value {
    json!({
        "status": "ok",
        "message": RUNNING_MESSAGE,
        "agent": state.config.app_name,
        "model": state
            .studio
            .as_ref()
            .map(|s| s.model_name().to_string())
            .unwrap_or_else(|| "Not configured".to_string()),
        "model_configured": state.studio.is_some(),
    })
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(status_body(&state))
}

/// The bundled frontend when present, otherwise API status
async fn index(State(state): State<AppState>) -> Response {
    let index_file = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index_file).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => {
            let mut body = status_body(&state);
            body["mode"] = json!("development - frontend not bundled");
            Json(body).into_response()
        }
    }
}

async fn create_content(
    State(state): State<AppState>,
    Json(req): Json<ContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let studio = state.require_studio()?;
    let session = studio.open_session(req.session_id).await;

    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(stream_pipeline(studio, session.id, req.brief, tx));

    let stream = ReceiverStream::new(rx).map(|msg: StreamMessage| Event::default().json_data(msg));

    Ok((
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))),
    ))
}

/// Drive one pipeline run, translating agent events into stream messages.
///
/// The run is dropped as soon as the client goes away.
async fn stream_pipeline(
    studio: Arc<Studio>,
    session_id: String,
    brief: ContentBrief,
    out: mpsc::Sender<StreamMessage>,
) {
    let closed = out.clone();
    tokio::select! {
        _ = closed.closed() => {
            log::info!("Client disconnected, abandoning session {}", session_id);
        }
        _ = run_and_forward(&studio, &session_id, &brief, &out) => {}
    }
}

async fn run_and_forward(
    studio: &Studio,
    session_id: &str,
    brief: &ContentBrief,
    out: &mpsc::Sender<StreamMessage>,
) {
    let _ = out
        .send(StreamMessage::Status {
            message: "Starting content creation workflow...".to_string(),
            session_id: session_id.to_string(),
        })
        .await;

    let (tx, mut rx) = mpsc::channel::<AgentEvent>(100);

    let run = async { studio.create_content(session_id, brief, Some(tx)).await };

    let forward = async {
        let mut chunks = String::new();
        while let Some(event) = rx.recv().await {
            let _ = out
                .send(StreamMessage::Event {
                    author: event.author().to_string(),
                    kind: event.kind().to_string(),
                    content_preview: event.preview(PREVIEW_CHARS),
                })
                .await;

            if let AgentEvent::Answer { author, text } = event {
                chunks.push_str(&text);
                let _ = out
                    .send(StreamMessage::Chunk {
                        content: text,
                        author,
                        session_id: session_id.to_string(),
                    })
                    .await;
            }
        }
        chunks
    };

    let (result, chunks) = tokio::join!(run, forward);

    let last = match result {
        Ok(output) => {
            let content = output
                .state
                .get(StateKey::FinalContentPackage)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .unwrap_or(chunks);
            if content.is_empty() {
                StreamMessage::Error {
                    message: "No response received from agent".to_string(),
                }
            } else {
                StreamMessage::Complete {
                    content,
                    session_id: session_id.to_string(),
                }
            }
        }
        Err(e) => {
            log::error!("Content creation failed for session {}: {}", session_id, e);
            StreamMessage::Error {
                message: e.to_string(),
            }
        }
    };
    let _ = out.send(last).await;
}

async fn analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    let studio = state.require_studio()?;
    let analysis = studio.analyze_text(&req.text).await?;

    let analysis = if analysis.is_empty() {
        "No analysis received".to_string()
    } else {
        analysis
    };
    Ok(Json(json!({ "status": "success", "analysis": analysis })))
}
