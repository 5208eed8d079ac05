//! Search service
//!
//! Substring search over live pages (title and content), paginated at ten
//! results per page. An empty or absent query yields zero results rather
//! than an error.

use std::sync::Arc;

use anyhow::Result;

use crate::db::repositories::PageRepository;
use crate::models::{resolve_page, ListParams, Page, PagedResult};

/// Results per search page
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Search service
pub struct SearchService {
    pages: Arc<dyn PageRepository>,
}

impl SearchService {
    pub fn new(pages: Arc<dyn PageRepository>) -> Self {
        Self { pages }
    }

    /// Run a search. The raw page value clamps like every other listing.
    pub async fn search(
        &self,
        query: Option<&str>,
        raw_page: Option<&str>,
    ) -> Result<PagedResult<Page>> {
        let query = match query.map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => {
                return Ok(PagedResult::new(
                    Vec::new(),
                    0,
                    &ListParams::new(1, SEARCH_PAGE_SIZE),
                ))
            }
        };

        let total = self.pages.count_search(query).await?;
        let page = resolve_page(raw_page, total, SEARCH_PAGE_SIZE);
        let params = ListParams::new(page, SEARCH_PAGE_SIZE);

        let items = self
            .pages
            .search_live(query, params.limit(), params.offset())
            .await?;
        Ok(PagedResult::new(items, total, &params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxPageRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePageInput, FlexDetails, HomeDetails, PageDetails};
    use crate::services::page::PageService;

    async fn setup() -> (PageService, SearchService) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let repo = SqlxPageRepository::boxed(pool.clone());
        let pages = PageService::new(repo.clone(), create_cache(&CacheConfig::default()));
        (pages, SearchService::new(repo))
    }

    async fn seed_tree(pages: &PageService, titles: &[&str]) {
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

        for title in titles {
            pages
                .create_page(CreatePageInput {
                    parent_id: Some(home.id),
                    title: title.to_string(),
                    slug: crate::services::generate_slug(title),
                    details: PageDetails::Flex(FlexDetails::default()),
                    live: true,
                    owner: None,
                    tags: vec![],
                    category_ids: vec![],
                    author_ids: vec![],
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn empty_query_returns_nothing() {
        let (pages, search) = setup().await;
        seed_tree(&pages, &["Alpha news"]).await;

        let result = search.search(None, None).await.unwrap();
        assert_eq!(result.total, 0);

        let result = search.search(Some("   "), None).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn matches_title_substring() {
        let (pages, search) = setup().await;
        seed_tree(&pages, &["Alpha news", "Beta report", "More alpha things"]).await;

        let result = search.search(Some("alpha"), None).await.unwrap();
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn paginates_at_ten() {
        let (pages, search) = setup().await;
        let titles: Vec<String> = (0..12).map(|i| format!("Widget {}", i)).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        seed_tree(&pages, &refs).await;

        let first = search.search(Some("Widget"), None).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.total_pages(), 2);

        let second = search.search(Some("Widget"), Some("2")).await.unwrap();
        assert_eq!(second.len(), 2);

        // Past the end clamps to the last page.
        let clamped = search.search(Some("Widget"), Some("9")).await.unwrap();
        assert_eq!(clamped.page, 2);
        assert_eq!(clamped.len(), 2);
    }
}
