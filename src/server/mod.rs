#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app::{AppContext, AskOutcome, StatusReport};
use crate::ingest::{IngestInput, IngestReport};

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the application router.
pub fn router(app: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/api/ask", post(ask))
        .route("/api/upload", post(upload))
        .route("/api/status", get(status))
        .with_state(app)
        .layer(TraceLayer::new_for_http())
}

/// Bootstrap the context and serve the web UI until the process exits.
pub async fn serve(app: AppContext) -> Result<()> {
    let addr = app.config.server_addr();
    let app = Arc::new(app);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Serving chat UI at http://{}", addr);

    axum::serve(listener, router(app))
        .await
        .context("Server error")?;

    Ok(())
}

async fn ask(
    State(app): State<Arc<AppContext>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskOutcome>, (StatusCode, Json<ErrorResponse>)> {
    if request.question.trim().is_empty() {
        return Err(bad_request("Question cannot be empty"));
    }

    Ok(Json(app.ask(&request.question).await))
}

async fn upload(
    State(app): State<Arc<AppContext>>,
    mut multipart: Multipart,
) -> Result<Json<IngestReport>, (StatusCode, Json<ErrorResponse>)> {
    let mut inputs = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Malformed upload: {}", e)))?
    {
        let label = field
            .file_name()
            .or_else(|| field.name())
            .unwrap_or("upload")
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(&format!("Failed to read upload '{}': {}", label, e)))?;

        inputs.push(IngestInput::new(label, bytes.to_vec()));
    }

    if inputs.is_empty() {
        return Err(bad_request("No files in upload"));
    }

    let report = app.ingest(inputs).await;
    if !report.all_succeeded() {
        warn!(
            "Upload batch finished with failures: {} of {} items succeeded",
            report.items.iter().filter(|i| i.succeeded()).count(),
            report.items.len()
        );
    }

    Ok(Json(report))
}

async fn status(
    State(app): State<Arc<AppContext>>,
) -> Result<Json<StatusReport>, (StatusCode, Json<ErrorResponse>)> {
    app.status().await.map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
