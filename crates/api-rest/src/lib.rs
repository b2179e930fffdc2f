//! # API REST
//!
//! REST API for the ERA webpage generator.
//!
//! Handles:
//! - HTTP endpoints with axum (multipart uploads, JSON envelopes)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (CORS, body limits, static form page)
//!
//! Uses `api-shared` for the wire types and `era-core` for the generation pipeline.

#![warn(rust_2018_idioms)]

mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    GenerateWebpageErrorRes, GenerateWebpageForm, GenerateWebpageRes, HealthRes,
    ShareExampleErrorRes, ShareExampleForm, ShareExampleRes,
};
use era_core::{constants::MAX_UPLOAD_BYTES, UploadDir, WebpageService};

/// Headroom above the file ceiling for the text fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    service: WebpageService,
    uploads: UploadDir,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: WebpageService, uploads: UploadDir) -> Self {
        Self {
            service,
            uploads,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::generate_webpage, handlers::share_example),
    components(schemas(
        HealthRes,
        GenerateWebpageForm,
        GenerateWebpageRes,
        GenerateWebpageErrorRes,
        ShareExampleForm,
        ShareExampleRes,
        ShareExampleErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the application router.
///
/// API routes are matched first; anything else is served from `public_dir`.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let body_limit = state.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/generate-webpage", post(handlers::generate_webpage))
        .route("/api/share-example", post(handlers::share_example))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
