//! Site front end
//!
//! Server-rendered views over the page tree. The catch-all route walks the
//! slug path from the root; paths that do not land on a page fall through to
//! the sub-route dispatch (`.../subscribe` under a home page,
//! `.../category/{slug}` under a blog listing) before giving up with a 404.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tera::Context as TeraContext;

use crate::api::AppState;
use crate::models::{Page, PageDetails};
use crate::services::{render_simple, PageServiceError};

/// Error type for site views
#[derive(Debug)]
pub enum SiteError {
    NotFound,
    Internal(anyhow::Error),
}

impl From<PageServiceError> for SiteError {
    fn from(err: PageServiceError) -> Self {
        match err {
            PageServiceError::NotFound(_) => SiteError::NotFound,
            other => SiteError::Internal(other.into()),
        }
    }
}

impl From<anyhow::Error> for SiteError {
    fn from(err: anyhow::Error) -> Self {
        SiteError::Internal(err)
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        match self {
            SiteError::NotFound => {
                (StatusCode::NOT_FOUND, Html("<h1>Page not found</h1>".to_string())).into_response()
            }
            SiteError::Internal(err) => {
                tracing::error!("site error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Something went wrong</h1>".to_string()),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ListingQuery {
    pub tag: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

/// Front-end routes, merged into the main router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/search", get(search))
        .route("/{*path}", get(resolve))
}

async fn root(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Html<String>, SiteError> {
    let page = state
        .page_service
        .resolve_path("")
        .await?
        .filter(|p| p.live)
        .ok_or(SiteError::NotFound)?;
    render_page(&state, &page, &query).await
}

async fn resolve(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Html<String>, SiteError> {
    if let Some(page) = state.page_service.resolve_path(&path).await? {
        if !page.live {
            return Err(SiteError::NotFound);
        }
        return render_page(&state, &page, &query).await;
    }

    // The full path did not land on a page; try the sub-routes.
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if let Some((&"subscribe", prefix)) = segments.split_last() {
        let owner = state.page_service.resolve_path(&prefix.join("/")).await?;
        if let Some(page) = owner.filter(|p| p.live && matches!(p.details, PageDetails::Home(_))) {
            return render_subscribe(&state, &page).await;
        }
    }

    if segments.len() >= 2 && segments[segments.len() - 2] == "category" {
        let slug = segments[segments.len() - 1];
        let prefix = segments[..segments.len() - 2].join("/");
        let owner = state.page_service.resolve_path(&prefix).await?;
        if let Some(page) =
            owner.filter(|p| p.live && matches!(p.details, PageDetails::BlogListing(_)))
        {
            return render_category(&state, &page, slug).await;
        }
    }

    Err(SiteError::NotFound)
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, SiteError> {
    let results = state
        .search_service
        .search(query.query.as_deref(), query.page.as_deref())
        .await?;

    let mut ctx = base_context(&state).await?;
    ctx.insert("search_query", &query.query);
    ctx.insert(
        "results",
        &pages_with_urls(&state, &results.items).await?,
    );
    ctx.insert(
        "pagination",
        &json!({
            "page": results.page,
            "total": results.total,
            "total_pages": results.total_pages(),
            "has_next": results.has_next(),
            "has_prev": results.has_prev(),
        }),
    );

    let html = state
        .templates
        .render_page("search/search.html", &ctx, &state.site_name)?;
    Ok(Html(html))
}

/// Render a resolved live page with its kind's template
async fn render_page(
    state: &AppState,
    page: &Page,
    query: &ListingQuery,
) -> Result<Html<String>, SiteError> {
    let mut ctx = base_context(state).await?;
    ctx.insert("page", page);

    match &page.details {
        PageDetails::Home(home) => {
            ctx.insert("banner_title", &home.banner_title);
            ctx.insert("banner_subtitle_html", &render_simple(&home.banner_subtitle));
            ctx.insert(
                "banner_image",
                &state.projector.image_or_null(home.banner_image_id).await?,
            );
            ctx.insert("banner_cta", &banner_cta(state, home.banner_cta_page_id).await?);

            let mut carousel = Vec::with_capacity(home.carousel_image_ids.len());
            for image_id in &home.carousel_image_ids {
                carousel.push(state.projector.image_or_null(Some(*image_id)).await?);
            }
            ctx.insert("carousel_images", &carousel);
            ctx.insert("content", &state.projector.project(&home.content).await?);
        }
        PageDetails::BlogListing(listing) => {
            let context = state
                .blog_service
                .listing_context(query.tag.as_deref(), query.page.as_deref())
                .await?;
            ctx.insert("custom_title", &listing.custom_title);
            ctx.insert("posts", &pages_with_urls(state, &context.posts.items).await?);
            ctx.insert("categories", &context.categories);
            ctx.insert("tags", &context.tags);
            ctx.insert("active_tag", &context.active_tag);
            ctx.insert(
                "pagination",
                &json!({
                    "page": context.posts.page,
                    "total": context.posts.total,
                    "total_pages": context.posts.total_pages(),
                    "has_next": context.posts.has_next(),
                    "has_prev": context.posts.has_prev(),
                }),
            );
        }
        PageDetails::Article(article) => {
            blog_context(state, page, &article.blog, &mut ctx).await?;
            ctx.insert("subtitle", &article.subtitle);
            ctx.insert(
                "intro_images",
                &state.projector.project(&article.intro_images).await?,
            );
        }
        PageDetails::Video(video) => {
            blog_context(state, page, &video.blog, &mut ctx).await?;
            ctx.insert("video_url", &video.video_url);
        }
        PageDetails::Flex(flex) => {
            ctx.insert("subtitle", &flex.subtitle);
            ctx.insert("content", &state.projector.project(&flex.content).await?);
        }
        PageDetails::Contact => {}
    }

    let html = state
        .templates
        .render_page(page.kind.template(), &ctx, &state.site_name)?;
    Ok(Html(html))
}

async fn render_subscribe(state: &AppState, page: &Page) -> Result<Html<String>, SiteError> {
    let mut ctx = base_context(state).await?;
    ctx.insert("page", page);
    let html = state
        .templates
        .render_page("home/subscribe.html", &ctx, &state.site_name)?;
    Ok(Html(html))
}

/// The category sub-route. An unknown slug renders an empty list.
async fn render_category(
    state: &AppState,
    listing: &Page,
    slug: &str,
) -> Result<Html<String>, SiteError> {
    let posts = state.blog_service.category_posts(slug).await?;

    let mut ctx = base_context(state).await?;
    ctx.insert("page", listing);
    ctx.insert("posts", &pages_with_urls(state, &posts).await?);
    ctx.insert("category_slug", slug);

    let html = state
        .templates
        .render_page("blog/latest_posts.html", &ctx, &state.site_name)?;
    Ok(Html(html))
}

/// Context shared by every view: the per-site social media settings
async fn base_context(state: &AppState) -> Result<TeraContext, SiteError> {
    let settings = state.settings_service.for_site(&state.site_name).await?;
    let mut ctx = TeraContext::new();
    ctx.insert("settings", &settings);
    Ok(ctx)
}

/// Tags, categories, and author entries shared by article and video views
async fn blog_context(
    state: &AppState,
    page: &Page,
    blog: &crate::models::BlogFields,
    ctx: &mut TeraContext,
) -> Result<(), SiteError> {
    ctx.insert("custom_title", &blog.custom_title);
    ctx.insert(
        "banner_images",
        &state.projector.project(&blog.banner_images).await?,
    );
    ctx.insert("content", &state.projector.project(&blog.content).await?);
    ctx.insert("tags", &state.page_repo.tags_for(page.id).await?);
    ctx.insert("categories", &state.page_repo.categories_for(page.id).await?);

    let authors = state.page_repo.authors_for(page.id).await?;
    let mut author_values = Vec::with_capacity(authors.len());
    for entry in &authors {
        author_values.push(json!({
            "name": entry.author.name,
            "website": entry.author.website,
            "image": state.projector.image_or_null(entry.author.image_id).await?,
        }));
    }
    ctx.insert("authors", &author_values);
    Ok(())
}

async fn banner_cta(state: &AppState, page_id: Option<i64>) -> Result<Value, SiteError> {
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
    Ok(json!({ "title": target.title, "url": url }))
}

/// Pages serialized with their tree URLs attached
async fn pages_with_urls(state: &AppState, pages: &[Page]) -> Result<Vec<Value>, SiteError> {
    let mut values = Vec::with_capacity(pages.len());
    for page in pages {
        let url = state.page_repo.url_path(page.id).await?.unwrap_or_default();
        let mut value = serde_json::to_value(page).map_err(anyhow::Error::from)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("url".to_string(), json!(url));
        }
        values.push(value);
    }
    Ok(values)
}
