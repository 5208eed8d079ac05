//! Page service
//!
//! Business logic for the page tree:
//! - creation with capability-table, singleton, and validation checks
//! - saving, with blog-post preview invalidation through the cache port
//! - slug-path resolution for the site front end

use std::sync::Arc;

use chrono::Utc;

use crate::blocks::{validate_stream, BlockError, StreamContext};
use crate::cache::Cache;
use crate::db::repositories::PageRepository;
use crate::models::{
    CreatePageInput, Page, PageDetails, PageKind, AUTHORS_MAX, AUTHORS_MIN, CAROUSEL_MAX,
    CAROUSEL_MIN,
};

/// Error types for page service operations
#[derive(Debug, thiserror::Error)]
pub enum PageServiceError {
    #[error("Page not found: {0}")]
    NotFound(i64),

    #[error("A '{child}' page cannot be created under '{parent}'")]
    InvalidParent { child: PageKind, parent: String },

    #[error("Only {max} page(s) of kind '{kind}' may exist")]
    MaxCountReached { kind: PageKind, max: u32 },

    #[error("A sibling page already uses slug '{0}'")]
    DuplicateSlug(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Page service
pub struct PageService {
    repo: Arc<dyn PageRepository>,
    cache: Cache,
}

impl PageService {
    pub fn new(repo: Arc<dyn PageRepository>, cache: Cache) -> Self {
        Self { repo, cache }
    }

    /// Create a page under the given parent.
    ///
    /// Checks, in order: the capability table (both directions), the
    /// per-kind instance limit, sibling slug uniqueness, kind-specific
    /// field and stream validation, and blog-post association bounds.
    pub async fn create_page(&self, input: CreatePageInput) -> Result<Page, PageServiceError> {
        let kind = input.details.kind();

        let parent_kind = match input.parent_id {
            Some(parent_id) => {
                let parent = self
                    .repo
                    .get_by_id(parent_id)
                    .await?
                    .ok_or(PageServiceError::NotFound(parent_id))?;
                Some(parent.kind)
            }
            None => None,
        };

        if !kind.can_nest_under(parent_kind) {
            return Err(PageServiceError::InvalidParent {
                child: kind,
                parent: parent_kind
                    .map(|k| k.as_str().to_string())
                    .unwrap_or_else(|| "the tree root".to_string()),
            });
        }

        if let Some(max) = kind.max_count() {
            let existing = self.repo.count_kind(kind).await?;
            if existing >= max as i64 {
                return Err(PageServiceError::MaxCountReached { kind, max });
            }
        }

        if input.slug.trim().is_empty() {
            return Err(PageServiceError::Validation("slug must not be empty".into()));
        }
        if self
            .repo
            .child_by_slug(input.parent_id, &input.slug)
            .await?
            .is_some()
        {
            return Err(PageServiceError::DuplicateSlug(input.slug.clone()));
        }

        validate_details(&input.details)?;

        if kind.is_blog_post() {
            let authors = input.author_ids.len();
            if !(AUTHORS_MIN..=AUTHORS_MAX).contains(&authors) {
                return Err(PageServiceError::Validation(format!(
                    "blog posts need {}..={} authors, got {}",
                    AUTHORS_MIN, AUTHORS_MAX, authors
                )));
            }
        }

        let mut page = Page::new(input.parent_id, input.title, input.slug, input.details);
        page.owner = input.owner;
        if input.live {
            page.live = true;
            page.first_published_at = Some(Utc::now());
        }

        let page = self.repo.create(&page).await?;
        tracing::info!(page_id = page.id, kind = %page.kind, "Created page");

        if page.kind.is_blog_post() {
            self.repo.set_tags(page.id, &input.tags).await?;
            self.repo
                .set_categories(page.id, &input.category_ids)
                .await?;
            self.repo.set_authors(page.id, &input.author_ids).await?;
        }

        Ok(page)
    }

    /// Save changes to a page.
    ///
    /// For blog posts the preview cache entry is invalidated before the
    /// write, once per save, whether or not the key exists.
    pub async fn save_page(&self, page: &Page) -> Result<Page, PageServiceError> {
        validate_details(&page.details)?;

        if page.kind.is_blog_post() {
            let key = preview_cache_key(page.id);
            self.cache.delete(&key).await?;
            tracing::debug!(page_id = page.id, key = %key, "Invalidated post preview");
        }

        let mut page = page.clone();
        if page.live && page.first_published_at.is_none() {
            page.first_published_at = Some(Utc::now());
        }

        Ok(self.repo.update(&page).await?)
    }

    pub async fn get_page(&self, id: i64) -> Result<Option<Page>, PageServiceError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    /// URL of a page within the tree
    pub async fn page_url(&self, id: i64) -> Result<Option<String>, PageServiceError> {
        Ok(self.repo.url_path(id).await?)
    }

    /// Resolve a slash-separated slug path to a page, starting at the root.
    /// An empty path resolves to the root itself.
    pub async fn resolve_path(&self, path: &str) -> Result<Option<Page>, PageServiceError> {
        let mut current = match self.repo.get_root().await? {
            Some(root) => root,
            None => return Ok(None),
        };

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match self.repo.child_by_slug(Some(current.id), segment).await? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Direct children of a page, live ones only
    pub async fn live_children(&self, id: i64) -> Result<Vec<Page>, PageServiceError> {
        let children = self.repo.children_of(id).await?;
        Ok(children.into_iter().filter(|p| p.live).collect())
    }
}

/// Cache key for a blog post's rendered preview
pub fn preview_cache_key(page_id: i64) -> String {
    format!("blog_post_preview_{}", page_id)
}

/// Kind-specific field and stream validation
fn validate_details(details: &PageDetails) -> Result<(), PageServiceError> {
    match details {
        PageDetails::Home(home) => {
            if home.banner_title.trim().is_empty() {
                return Err(PageServiceError::Validation(
                    "banner_title must not be empty".into(),
                ));
            }
            let carousel = home.carousel_image_ids.len();
            if !(CAROUSEL_MIN..=CAROUSEL_MAX).contains(&carousel) {
                return Err(PageServiceError::Validation(format!(
                    "carousel needs {}..={} images, got {}",
                    CAROUSEL_MIN, CAROUSEL_MAX, carousel
                )));
            }
            validate_stream(&home.content, StreamContext::HomeContent)?;
        }
        PageDetails::BlogListing(listing) => {
            if listing.custom_title.trim().is_empty() {
                return Err(PageServiceError::Validation(
                    "custom_title must not be empty".into(),
                ));
            }
        }
        PageDetails::Article(article) => {
            validate_blog_fields(&article.blog)?;
            validate_stream(&article.intro_images, StreamContext::ImageStream)?;
        }
        PageDetails::Video(video) => {
            validate_blog_fields(&video.blog)?;
        }
        PageDetails::Flex(flex) => {
            validate_stream(&flex.content, StreamContext::FlexContent)?;
        }
        PageDetails::Contact => {}
    }
    Ok(())
}

fn validate_blog_fields(blog: &crate::models::BlogFields) -> Result<(), PageServiceError> {
    if blog.custom_title.trim().is_empty() {
        return Err(PageServiceError::Validation(
            "custom_title must not be empty".into(),
        ));
    }
    validate_stream(&blog.banner_images, StreamContext::ImageStream)?;
    validate_stream(&blog.content, StreamContext::BlogContent)?;
    Ok(())
}
