use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::Extractor;
use crate::types::RunSummary;

/// Shared state for the webhook server.
pub struct AppState {
    extractor: Arc<Extractor>,
    background: bool,
    /// Held for the whole of a pass so triggers never overlap.
    run_lock: Mutex<()>,
}

impl AppState {
    pub fn new(extractor: Extractor, background: bool) -> Arc<Self> {
        Arc::new(Self {
            extractor: Arc::new(extractor),
            background,
            run_lock: Mutex::new(()),
        })
    }

    /// Wait for any running pass, then run one.
    pub async fn run_pass(&self) -> Result<RunSummary> {
        let _guard = self.run_lock.lock().await;
        let run_id = Uuid::new_v4();
        self.extractor
            .process_ready_documents()
            .instrument(tracing::info_span!("extraction_pass", %run_id))
            .await
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/notion-webhook", post(notion_webhook))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

async fn notion_webhook(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!(background = state.background, "Webhook received");

    if state.background {
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = state.run_pass().await {
                error!(error = %e, "Background extraction pass failed");
            }
        });
        return (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" })));
    }

    match state.run_pass().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "status": "complete",
                "completed": summary.completed,
                "failed": summary.failed,
                "skipped": summary.skipped,
            })),
        ),
        Err(e) => {
            error!(error = %e, "Extraction pass failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
