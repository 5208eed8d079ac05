//! Arbor - a lightweight page-tree CMS server

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arbor::{
    api::{self, serializers::StreamProjector, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCategoryRepository, SqlxDocumentRepository, SqlxImageRepository,
            SqlxPageRepository, SqlxSettingsRepository, SqlxTagRepository,
        },
    },
    render::TemplateEngine,
    services::{BlogService, PageService, SearchService, SettingsService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbor=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Arbor CMS...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    // Create repositories
    let page_repo = SqlxPageRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let image_repo = SqlxImageRepository::boxed(pool.clone());
    let document_repo = SqlxDocumentRepository::boxed(pool.clone());
    let settings_repo = SqlxSettingsRepository::boxed(pool.clone());

    // Create services
    let page_service = Arc::new(PageService::new(page_repo.clone(), cache));
    let blog_service = Arc::new(BlogService::new(page_repo.clone(), category_repo, tag_repo));
    let search_service = Arc::new(SearchService::new(page_repo.clone()));
    let settings_service = Arc::new(SettingsService::new(settings_repo));
    let projector = Arc::new(StreamProjector::new(page_repo.clone(), image_repo.clone()));

    // Load templates
    let templates = Arc::new(TemplateEngine::new(&config.site.templates_dir)?);
    tracing::info!("Templates loaded from {}", config.site.templates_dir);

    // Build application state
    let state = AppState {
        page_service,
        blog_service,
        search_service,
        settings_service,
        page_repo,
        image_repo,
        document_repo,
        projector,
        templates,
        site_name: config.site.name.clone(),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
