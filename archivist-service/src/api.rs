//! HTTP API for the Archivist service.
//!
//! This module provides the REST API endpoints for:
//! - Health monitoring
//! - Synchronous and asynchronous document upload
//! - Background job status polling

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::StaticConfig;
use crate::service::IngestService;

pub mod ingest;
use ingest::{job_status_handler, upload_async_handler, upload_sync_handler};

/// Application state
pub struct AppState {
    pub service: Arc<IngestService>,
}

/// Build the API router
pub fn router(service: Arc<IngestService>, config: &StaticConfig) -> Router {
    let state = Arc::new(AppState { service });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Use the configured max upload size for the multipart endpoints
    let max_body_size = config.ingest.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .route(
            "/upload",
            post(upload_sync_handler).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route(
            "/upload_async",
            post(upload_async_handler).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/jobs/{job_id}", get(job_status_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Jobs tracked by the registry, terminal ones included
    jobs: usize,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        jobs: state.service.tracked_jobs(),
    })
}
