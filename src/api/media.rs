//! Image and document API endpoints
//!
//! - GET /api/v2/images, /api/v2/images/{id}
//! - GET /api/v2/documents, /api/v2/documents/{id}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{serializers, ApiError, AppState};

/// Collection query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let total = state.image_repo.count().await?;
    let images = state
        .image_repo
        .list(query.limit.clamp(1, 100), query.offset.max(0))
        .await?;
    let items: Vec<Value> = images
        .iter()
        .map(|image| {
            let mut value = serializers::image_json(image);
            value["id"] = json!(image.id);
            value
        })
        .collect();
    Ok(Json(json!({ "meta": { "total_count": total }, "items": items })))
}

pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let image = state
        .image_repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("image {} not found", id)))?;
    let mut value = serializers::image_json(&image);
    value["id"] = json!(image.id);
    Ok(Json(value))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let total = state.document_repo.count().await?;
    let documents = state
        .document_repo
        .list(query.limit.clamp(1, 100), query.offset.max(0))
        .await?;
    let items: Vec<Value> = documents
        .iter()
        .map(|doc| {
            json!({
                "id": doc.id,
                "title": doc.title,
                "url": doc.file,
            })
        })
        .collect();
    Ok(Json(json!({ "meta": { "total_count": total }, "items": items })))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let document = state
        .document_repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("document {} not found", id)))?;
    Ok(Json(json!({
        "id": document.id,
        "title": document.title,
        "url": document.file,
    })))
}
