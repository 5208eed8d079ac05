//! Blog listing service
//!
//! Builds the paginated context for the blog listing page and its category
//! sub-route. Everything degrades gracefully: out-of-range page numbers
//! clamp, unknown tags or categories yield empty sets.

use std::sync::Arc;

use anyhow::Result;

use crate::db::repositories::{BlogPostFilter, CategoryRepository, PageRepository, TagRepository};
use crate::models::{resolve_page, BlogCategory, ListParams, Page, PagedResult, Tag};

/// Posts per listing page
pub const BLOG_PAGE_SIZE: u32 = 2;

/// Context for rendering the blog listing page
#[derive(Debug)]
pub struct BlogListingContext {
    /// The current page of posts, newest first publish first
    pub posts: PagedResult<Page>,
    /// All categories, for the sidebar
    pub categories: Vec<BlogCategory>,
    /// Tags in use on live posts, for the filter links
    pub tags: Vec<Tag>,
    /// The tag filter that produced this context, if any
    pub active_tag: Option<String>,
}

/// Blog service
pub struct BlogService {
    pages: Arc<dyn PageRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
}

impl BlogService {
    pub fn new(
        pages: Arc<dyn PageRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
    ) -> Self {
        Self {
            pages,
            categories,
            tags,
        }
    }

    /// Build the listing context for optional `tag` and `page` query values.
    ///
    /// The raw page string is resolved against the filtered total: absent or
    /// unparseable input means page 1, values past the end clamp to the last
    /// page.
    pub async fn listing_context(
        &self,
        tag: Option<&str>,
        raw_page: Option<&str>,
    ) -> Result<BlogListingContext> {
        let filter = BlogPostFilter {
            tag_slug: tag.map(str::to_string),
            category_id: None,
        };

        let total = self.pages.count_blog_posts(&filter).await?;
        let page = resolve_page(raw_page, total, BLOG_PAGE_SIZE);
        let params = ListParams::new(page, BLOG_PAGE_SIZE);

        let items = self
            .pages
            .list_blog_posts(&filter, params.limit(), params.offset())
            .await?;
        let categories = self.categories.list().await?;
        let tags = self.tags.list_used().await?;

        Ok(BlogListingContext {
            posts: PagedResult::new(items, total, &params),
            categories,
            tags,
            active_tag: tag.map(str::to_string),
        })
    }

    /// All live posts in a category, or an empty list when the slug does not
    /// resolve to a category. Never an error.
    pub async fn category_posts(&self, slug: &str) -> Result<Vec<Page>> {
        let category = match self.categories.get_by_slug(slug).await? {
            Some(category) => category,
            None => return Ok(Vec::new()),
        };

        let filter = BlogPostFilter {
            tag_slug: None,
            category_id: Some(category.id),
        };
        let total = self.pages.count_blog_posts(&filter).await?;
        self.pages.list_blog_posts(&filter, total.max(1), 0).await
    }

    /// All categories
    pub async fn all_categories(&self) -> Result<Vec<BlogCategory>> {
        self.categories.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::{SqlxCategoryRepository, SqlxPageRepository, SqlxTagRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{
        ArticleDetails, BlogFields, BlogListingDetails, CreatePageInput, HomeDetails,
        PageDetails,
    };
    use crate::services::page::PageService;
    use sqlx::SqlitePool;

    struct Fixture {
        pool: SqlitePool,
        pages: PageService,
        blog: BlogService,
        listing_id: i64,
        author_id: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let page_repo = SqlxPageRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let pages = PageService::new(page_repo.clone(), create_cache(&CacheConfig::default()));
        let blog = BlogService::new(page_repo, category_repo, SqlxTagRepository::boxed(pool.clone()));

        let home = pages
            .create_page(CreatePageInput {
                parent_id: None,
                title: "Home".to_string(),
                slug: "home".to_string(),
                details: PageDetails::Home(HomeDetails {
                    banner_title: "Welcome".to_string(),
                    banner_subtitle: String::new(),
                    carousel_image_ids: vec![1],
                    ..Default::default()
                }),
                live: true,
                owner: None,
                tags: vec![],
                category_ids: vec![],
                author_ids: vec![],
            })
            .await
            .unwrap();

        let listing = pages
            .create_page(CreatePageInput {
                parent_id: Some(home.id),
                title: "Blog".to_string(),
                slug: "blog".to_string(),
                details: PageDetails::BlogListing(BlogListingDetails {
                    custom_title: "Latest posts".to_string(),
                }),
                live: true,
                owner: None,
                tags: vec![],
                category_ids: vec![],
                author_ids: vec![],
            })
            .await
            .unwrap();

        let author_id = sqlx::query("INSERT INTO authors (name) VALUES ('Writer')")
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid();

        Fixture {
            pool,
            pages,
            blog,
            listing_id: listing.id,
            author_id,
        }
    }

    async fn seed_post(
        fx: &Fixture,
        slug: &str,
        tags: Vec<String>,
        category_ids: Vec<i64>,
    ) -> i64 {
        let post = fx
            .pages
            .create_page(CreatePageInput {
                parent_id: Some(fx.listing_id),
                title: slug.to_string(),
                slug: slug.to_string(),
                details: PageDetails::Article(ArticleDetails {
                    blog: BlogFields {
                        custom_title: format!("Post {}", slug),
                        ..Default::default()
                    },
                    ..Default::default()
                }),
                live: true,
                owner: None,
                tags,
                category_ids,
                author_ids: vec![fx.author_id],
            })
            .await
            .unwrap();

        // Spread publish times so ordering is deterministic.
        sqlx::query(
            "UPDATE pages SET first_published_at = datetime('now', '-' || id || ' hours') \
             WHERE id = ?",
        )
        .bind(post.id)
        .execute(&fx.pool)
        .await
        .unwrap();
        post.id
    }

    #[tokio::test]
    async fn listing_paginates_by_two() {
        let fx = setup().await;
        for i in 0..5 {
            seed_post(&fx, &format!("post-{}", i), vec![], vec![]).await;
        }

        let ctx = fx.blog.listing_context(None, None).await.unwrap();
        assert_eq!(ctx.posts.len(), 2);
        assert_eq!(ctx.posts.total, 5);
        assert_eq!(ctx.posts.total_pages(), 3);

        let last = fx.blog.listing_context(None, Some("3")).await.unwrap();
        assert_eq!(last.posts.len(), 1);
    }

    #[tokio::test]
    async fn overflow_page_equals_last_page() {
        let fx = setup().await;
        for i in 0..5 {
            seed_post(&fx, &format!("post-{}", i), vec![], vec![]).await;
        }

        // ceil(5/2) + 5 = 8, far past the end
        let clamped = fx.blog.listing_context(None, Some("8")).await.unwrap();
        let last = fx.blog.listing_context(None, Some("3")).await.unwrap();

        let clamped_ids: Vec<i64> = clamped.posts.items.iter().map(|p| p.id).collect();
        let last_ids: Vec<i64> = last.posts.items.iter().map(|p| p.id).collect();
        assert_eq!(clamped_ids, last_ids);
        assert_eq!(clamped.posts.page, 3);
    }

    #[tokio::test]
    async fn garbage_page_falls_back_to_first() {
        let fx = setup().await;
        for i in 0..3 {
            seed_post(&fx, &format!("post-{}", i), vec![], vec![]).await;
        }
        let ctx = fx.blog.listing_context(None, Some("nope")).await.unwrap();
        assert_eq!(ctx.posts.page, 1);
        assert_eq!(ctx.posts.len(), 2);
    }

    #[tokio::test]
    async fn tag_filter_matches_exact_slug() {
        let fx = setup().await;
        let tagged_a = seed_post(&fx, "a", vec!["rust".to_string()], vec![]).await;
        let tagged_b = seed_post(&fx, "b", vec!["rust".to_string()], vec![]).await;
        seed_post(&fx, "c", vec!["python".to_string()], vec![]).await;
        seed_post(&fx, "d", vec![], vec![]).await;

        let ctx = fx.blog.listing_context(Some("rust"), None).await.unwrap();
        assert_eq!(ctx.posts.total, 2);
        let ids: Vec<i64> = ctx.posts.items.iter().map(|p| p.id).collect();
        assert!(ids.contains(&tagged_a));
        assert!(ids.contains(&tagged_b));

        // Newest publish first
        let times: Vec<_> = ctx
            .posts
            .items
            .iter()
            .map(|p| p.first_published_at.unwrap())
            .collect();
        assert!(times[0] >= times[1]);
    }

    #[tokio::test]
    async fn unknown_tag_yields_empty_first_page() {
        let fx = setup().await;
        seed_post(&fx, "a", vec!["rust".to_string()], vec![]).await;
        let ctx = fx.blog.listing_context(Some("cobol"), None).await.unwrap();
        assert_eq!(ctx.posts.total, 0);
        assert!(ctx.posts.is_empty());
    }

    #[tokio::test]
    async fn category_posts_by_slug() {
        let fx = setup().await;
        let category_id =
            sqlx::query("INSERT INTO categories (name, slug) VALUES ('News', 'news')")
                .execute(&fx.pool)
                .await
                .unwrap()
                .last_insert_rowid();

        let in_cat = seed_post(&fx, "a", vec![], vec![category_id]).await;
        seed_post(&fx, "b", vec![], vec![]).await;

        let posts = fx.blog.category_posts("news").await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, in_cat);
    }

    #[tokio::test]
    async fn unknown_category_slug_is_empty_not_error() {
        let fx = setup().await;
        seed_post(&fx, "a", vec![], vec![]).await;
        let posts = fx.blog.category_posts("does-not-exist").await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn draft_posts_stay_out_of_listings() {
        let fx = setup().await;
        seed_post(&fx, "live-post", vec![], vec![]).await;
        // A draft: created not-live.
        fx.pages
            .create_page(CreatePageInput {
                parent_id: Some(fx.listing_id),
                title: "Draft".to_string(),
                slug: "draft".to_string(),
                details: PageDetails::Article(ArticleDetails {
                    blog: BlogFields {
                        custom_title: "Draft post".to_string(),
                        ..Default::default()
                    },
                    ..Default::default()
                }),
                live: false,
                owner: None,
                tags: vec![],
                category_ids: vec![],
                author_ids: vec![fx.author_id],
            })
            .await
            .unwrap();

        let ctx = fx.blog.listing_context(None, None).await.unwrap();
        assert_eq!(ctx.posts.total, 1);
    }

    #[tokio::test]
    async fn deleting_category_keeps_posts() {
        let fx = setup().await;
        let category_id =
            sqlx::query("INSERT INTO categories (name, slug) VALUES ('News', 'news')")
                .execute(&fx.pool)
                .await
                .unwrap()
                .last_insert_rowid();
        let post_id = seed_post(&fx, "a", vec![], vec![category_id]).await;

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category_id)
            .execute(&fx.pool)
            .await
            .unwrap();

        // The post survives; only the reference is gone.
        let page = fx.pages.get_page(post_id).await.unwrap();
        assert!(page.is_some());
        let posts = fx.blog.category_posts("news").await.unwrap();
        assert!(posts.is_empty());
    }
}
