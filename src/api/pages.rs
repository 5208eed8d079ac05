//! Page API endpoints
//!
//! - GET /api/v2/pages - live pages with their base fields
//! - GET /api/v2/pages/{id} - adds the kind-specific field set

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Map, Value};

use super::{serializers, ApiError, AppState};
use crate::models::{Page, PageDetails};

pub use super::media::ListQuery;

pub async fn list_pages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let total = state.page_repo.count_live().await?;
    let pages = state
        .page_repo
        .list_live(query.limit.clamp(1, 100), query.offset.max(0))
        .await?;

    let mut items = Vec::with_capacity(pages.len());
    for page in &pages {
        items.push(Value::Object(base_fields(&state, page).await?));
    }
    Ok(Json(json!({ "meta": { "total_count": total }, "items": items })))
}

pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let page = state
        .page_repo
        .get_by_id(id)
        .await?
        .filter(|page| page.live)
        .ok_or_else(|| ApiError::not_found(format!("page {} not found", id)))?;

    let mut fields = base_fields(&state, &page).await?;
    detail_fields(&state, &page, &mut fields).await?;
    Ok(Json(Value::Object(fields)))
}

/// Fields every page exposes
async fn base_fields(state: &AppState, page: &Page) -> Result<Map<String, Value>, ApiError> {
    let url = state.page_repo.url_path(page.id).await?.unwrap_or_default();
    let mut fields = Map::new();
    fields.insert("id".into(), json!(page.id));
    fields.insert("kind".into(), json!(page.kind.as_str()));
    fields.insert("title".into(), json!(page.title));
    fields.insert("slug".into(), json!(page.slug));
    fields.insert("url".into(), json!(url));
    fields.insert(
        "first_published_at".into(),
        json!(page.first_published_at.map(|dt| dt.to_rfc3339())),
    );
    Ok(fields)
}

/// Kind-specific fields for the detail endpoint
async fn detail_fields(
    state: &AppState,
    page: &Page,
    fields: &mut Map<String, Value>,
) -> Result<(), ApiError> {
    match &page.details {
        PageDetails::Home(home) => {
            fields.insert("banner_title".into(), json!(home.banner_title));
            fields.insert(
                "banner_subtitle".into(),
                json!(crate::services::render_simple(&home.banner_subtitle)),
            );
            fields.insert(
                "banner_image".into(),
                state.projector.image_or_null(home.banner_image_id).await?,
            );
            fields.insert(
                "banner_cta".into(),
                banner_cta_json(state, home.banner_cta_page_id).await?,
            );

            let mut carousel = Vec::with_capacity(home.carousel_image_ids.len());
            for image_id in &home.carousel_image_ids {
                carousel.push(state.projector.image_or_null(Some(*image_id)).await?);
            }
            fields.insert("carousel_images".into(), Value::Array(carousel));
            fields.insert(
                "content".into(),
                Value::Array(state.projector.project(&home.content).await?),
            );
            fields.insert(
                "banner_title_display".into(),
                json!(serializers::banner_title_display(&home.banner_title)),
            );
        }
        PageDetails::BlogListing(listing) => {
            fields.insert("custom_title".into(), json!(listing.custom_title));

            let children = state.page_service.live_children(page.id).await.map_err(
                |err| ApiError::internal(err.to_string()),
            )?;
            let mut with_urls = Vec::with_capacity(children.len());
            for child in children {
                let url = state
                    .page_repo
                    .url_path(child.id)
                    .await?
                    .unwrap_or_default();
                with_urls.push((child, url));
            }
            fields.insert("posts".into(), serializers::child_pages_json(&with_urls));
        }
        PageDetails::Article(article) => {
            blog_fields(state, page, &article.blog, fields).await?;
            fields.insert("subtitle".into(), json!(article.subtitle));
            fields.insert(
                "intro_images".into(),
                Value::Array(state.projector.project(&article.intro_images).await?),
            );
        }
        PageDetails::Video(video) => {
            blog_fields(state, page, &video.blog, fields).await?;
            fields.insert("video_url".into(), json!(video.video_url));
        }
        PageDetails::Flex(flex) => {
            fields.insert("subtitle".into(), json!(flex.subtitle));
            fields.insert(
                "content".into(),
                Value::Array(state.projector.project(&flex.content).await?),
            );
        }
        PageDetails::Contact => {}
    }
    Ok(())
}

/// Shared fields of article and video posts
async fn blog_fields(
    state: &AppState,
    page: &Page,
    blog: &crate::models::BlogFields,
    fields: &mut Map<String, Value>,
) -> Result<(), ApiError> {
    fields.insert("custom_title".into(), json!(blog.custom_title));
    fields.insert(
        "banner_images".into(),
        Value::Array(state.projector.project(&blog.banner_images).await?),
    );
    fields.insert(
        "content".into(),
        Value::Array(state.projector.project(&blog.content).await?),
    );

    let tags = state.page_repo.tags_for(page.id).await?;
    fields.insert(
        "tags".into(),
        Value::Array(
            tags.iter()
                .map(|tag| json!({ "name": tag.name, "slug": tag.slug }))
                .collect(),
        ),
    );

    let categories = state.page_repo.categories_for(page.id).await?;
    fields.insert(
        "categories".into(),
        Value::Array(
            categories
                .iter()
                .map(|c| json!({ "id": c.id, "name": c.name, "slug": c.slug }))
                .collect(),
        ),
    );

    let authors = state.page_repo.authors_for(page.id).await?;
    let mut author_values = Vec::with_capacity(authors.len());
    for entry in &authors {
        author_values.push(json!({
            "name": entry.author.name,
            "website": entry.author.website,
            "image": state.projector.image_or_null(entry.author.image_id).await?,
        }));
    }
    fields.insert("authors".into(), Value::Array(author_values));
    Ok(())
}

/// Banner CTA projection, or null when unset or stale
async fn banner_cta_json(state: &AppState, page_id: Option<i64>) -> Result<Value, ApiError> {
    let Some(page_id) = page_id else {
        return Ok(Value::Null);
    };
    let Some(target) = state.page_repo.get_by_id(page_id).await? else {
        return Ok(Value::Null);
    };
    let url = state
        .page_repo
        .url_path(target.id)
        .await?
        .unwrap_or_default();
    Ok(serializers::page_link_json(&target, &url))
}
