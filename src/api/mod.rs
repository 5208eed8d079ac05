//! API layer - HTTP handlers and routing
//!
//! The read API lives under `/api/v2` and exposes pages, images, and
//! documents (collection + detail each). The site front end (`crate::site`)
//! is merged into the same router at the root.

pub mod media;
pub mod pages;
pub mod serializers;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::db::repositories::{DocumentRepository, ImageRepository, PageRepository};
use crate::render::TemplateEngine;
use crate::services::{BlogService, PageService, SearchService, SettingsService};
use serializers::StreamProjector;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub page_service: Arc<PageService>,
    pub blog_service: Arc<BlogService>,
    pub search_service: Arc<SearchService>,
    pub settings_service: Arc<SettingsService>,
    pub page_repo: Arc<dyn PageRepository>,
    pub image_repo: Arc<dyn ImageRepository>,
    pub document_repo: Arc<dyn DocumentRepository>,
    pub projector: Arc<StreamProjector>,
    pub templates: Arc<TemplateEngine>,
    /// Site name used to scope settings
    pub site_name: String,
}

/// JSON error body for API responses
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", what)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("API error: {:#}", err);
        Self::internal("internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": { "code": self.code, "message": self.message }
        });
        (self.status, Json(body)).into_response()
    }
}

/// Build the read API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/pages", get(pages::list_pages))
        .route("/pages/{id}", get(pages::get_page))
        .route("/images", get(media::list_images))
        .route("/images/{id}", get(media::get_image))
        .route("/documents", get(media::list_documents))
        .route("/documents/{id}", get(media::get_document))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("*")),
        )
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api/v2", build_api_router())
        .nest_service("/static", ServeDir::new("static"))
        .merge(crate::site::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
