use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::item::ItemService;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;

pub mod items;

#[derive(Clone)]
pub struct ServerState {
    pub items: Arc<ItemService>,
}

/// Directory of locally stored images, mounted read-only at `public_path`.
#[derive(Debug, Clone)]
pub struct StaticUploads {
    pub dir: PathBuf,
    pub public_path: String,
}

pub struct RouterOptions {
    pub cors: CorsLayer,
    /// `None` when images live on a remote host.
    pub uploads: Option<StaticUploads>,
    pub max_upload_bytes: usize,
}

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(get, path = "/metrics", tag = "health",
    responses((status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain"))
)]
pub async fn metrics() -> Result<impl IntoResponse, JsonApiError> {
    let body = service::observability::encode_metrics()?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// Build the application router: item API, health/metrics, uploads and docs.
pub fn build_router(state: ServerState, opts: RouterOptions) -> Router {
    let api = Router::new()
        .route("/items", get(items::list).post(items::create))
        .route("/items/:id", get(items::get).delete(items::delete))
        .layer(DefaultBodyLimit::max(opts.max_upload_bytes));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(uploads) = opts.uploads {
        app = app.nest_service(&uploads.public_path, ServeDir::new(&uploads.dir));
    }

    app.with_state(state)
        .layer(opts.cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
