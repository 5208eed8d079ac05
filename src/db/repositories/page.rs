//! Page repository
//!
//! Database operations for the page tree, including the blog-post listing
//! queries and the tag/category/author edges owned by pages.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{BlogAuthor, BlogCategory, Page, PageAuthor, PageDetails, PageKind, Tag};

/// Filters for the live blog-post listing
#[derive(Debug, Clone, Default)]
pub struct BlogPostFilter {
    /// Exact tag slug
    pub tag_slug: Option<String>,
    /// Category id
    pub category_id: Option<i64>,
}

/// Page repository trait
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Insert a page; position is assigned as the next sibling slot
    async fn create(&self, page: &Page) -> Result<Page>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Page>>;

    /// The tree root (the page with no parent)
    async fn get_root(&self) -> Result<Option<Page>>;

    /// Direct children ordered by position
    async fn children_of(&self, parent_id: i64) -> Result<Vec<Page>>;

    /// Child of `parent_id` with the given slug; `None` parent means root level
    async fn child_by_slug(&self, parent_id: Option<i64>, slug: &str) -> Result<Option<Page>>;

    /// Number of pages of a kind in the whole tree
    async fn count_kind(&self, kind: PageKind) -> Result<i64>;

    /// Rewrite title, slug, live flag, publish time, and details
    async fn update(&self, page: &Page) -> Result<Page>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// Live pages for the API collection, ordered by id
    async fn list_live(&self, limit: i64, offset: i64) -> Result<Vec<Page>>;

    async fn count_live(&self) -> Result<i64>;

    /// Live blog posts, newest first publish first
    async fn list_blog_posts(
        &self,
        filter: &BlogPostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Page>>;

    async fn count_blog_posts(&self, filter: &BlogPostFilter) -> Result<i64>;

    /// Live pages matching the query in title or content, newest first
    async fn search_live(&self, query: &str, limit: i64, offset: i64) -> Result<Vec<Page>>;

    async fn count_search(&self, query: &str) -> Result<i64>;

    /// The page's URL: "/" for the root, slash-joined ancestor slugs otherwise
    async fn url_path(&self, id: i64) -> Result<Option<String>>;

    /// Replace a page's tags; names are upserted into the tag table
    async fn set_tags(&self, page_id: i64, names: &[String]) -> Result<()>;

    async fn tags_for(&self, page_id: i64) -> Result<Vec<Tag>>;

    /// Replace a page's category references
    async fn set_categories(&self, page_id: i64, category_ids: &[i64]) -> Result<()>;

    async fn categories_for(&self, page_id: i64) -> Result<Vec<BlogCategory>>;

    /// Replace a page's ordered author references
    async fn set_authors(&self, page_id: i64, author_ids: &[i64]) -> Result<()>;

    async fn authors_for(&self, page_id: i64) -> Result<Vec<PageAuthor>>;
}

/// SQLx-based page repository
pub struct SqlxPageRepository {
    pool: SqlitePool,
}

impl SqlxPageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn PageRepository> {
        Arc::new(Self::new(pool))
    }
}

const PAGE_COLUMNS: &str = "id, parent_id, position, kind, title, slug, live, \
                            first_published_at, owner, details, created_at, updated_at";

fn map_page(row: &SqliteRow) -> Result<Page> {
    let details_raw: String = row.get("details");
    let details: PageDetails =
        serde_json::from_str(&details_raw).context("Failed to parse page details")?;
    let kind_str: String = row.get("kind");
    let kind = PageKind::from_str(&kind_str)
        .with_context(|| format!("Unknown page kind: {}", kind_str))?;

    Ok(Page {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        position: row.get("position"),
        kind,
        title: row.get("title"),
        slug: row.get("slug"),
        live: row.get("live"),
        first_published_at: row.get::<Option<DateTime<Utc>>, _>("first_published_at"),
        owner: row.get("owner"),
        details,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl PageRepository for SqlxPageRepository {
    async fn create(&self, page: &Page) -> Result<Page> {
        let details = serde_json::to_string(&page.details)?;

        let position: i64 = match page.parent_id {
            Some(parent_id) => {
                let row: (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM pages WHERE parent_id = ?")
                        .bind(parent_id)
                        .fetch_one(&self.pool)
                        .await?;
                row.0
            }
            None => 0,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO pages
                (parent_id, position, kind, title, slug, live, first_published_at,
                 owner, details, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(page.parent_id)
        .bind(position)
        .bind(page.kind.as_str())
        .bind(&page.title)
        .bind(&page.slug)
        .bind(page.live)
        .bind(page.first_published_at)
        .bind(&page.owner)
        .bind(&details)
        .bind(page.created_at)
        .bind(page.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert page")?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .context("Inserted page not found")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Page>> {
        let row = sqlx::query(&format!("SELECT {} FROM pages WHERE id = ?", PAGE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_page).transpose()
    }

    async fn get_root(&self) -> Result<Option<Page>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM pages WHERE parent_id IS NULL ORDER BY position LIMIT 1",
            PAGE_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_page).transpose()
    }

    async fn children_of(&self, parent_id: i64) -> Result<Vec<Page>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pages WHERE parent_id = ? ORDER BY position",
            PAGE_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_page).collect()
    }

    async fn child_by_slug(&self, parent_id: Option<i64>, slug: &str) -> Result<Option<Page>> {
        let row = match parent_id {
            Some(parent_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM pages WHERE parent_id = ? AND slug = ?",
                    PAGE_COLUMNS
                ))
                .bind(parent_id)
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM pages WHERE parent_id IS NULL AND slug = ?",
                    PAGE_COLUMNS
                ))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        row.as_ref().map(map_page).transpose()
    }

    async fn count_kind(&self, kind: PageKind) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pages WHERE kind = ?")
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(&self, page: &Page) -> Result<Page> {
        let details = serde_json::to_string(&page.details)?;
        sqlx::query(
            r#"
            UPDATE pages
            SET title = ?, slug = ?, live = ?, first_published_at = ?, owner = ?,
                details = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&page.title)
        .bind(&page.slug)
        .bind(page.live)
        .bind(page.first_published_at)
        .bind(&page.owner)
        .bind(&details)
        .bind(Utc::now())
        .bind(page.id)
        .execute(&self.pool)
        .await
        .context("Failed to update page")?;

        self.get_by_id(page.id)
            .await?
            .context("Updated page not found")
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete page")?;
        Ok(())
    }

    async fn list_live(&self, limit: i64, offset: i64) -> Result<Vec<Page>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pages WHERE live = 1 ORDER BY id LIMIT ? OFFSET ?",
            PAGE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_page).collect()
    }

    async fn count_live(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pages WHERE live = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn list_blog_posts(
        &self,
        filter: &BlogPostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Page>> {
        let base = format!(
            "SELECT {} FROM pages p \
             WHERE p.kind IN ('article', 'video') AND p.live = 1",
            PAGE_COLUMNS
        );
        let order = " ORDER BY p.first_published_at DESC LIMIT ? OFFSET ?";

        let rows = match (&filter.tag_slug, filter.category_id) {
            (Some(tag_slug), _) => {
                let sql = format!(
                    "{} AND p.id IN (SELECT pt.page_id FROM page_tags pt \
                     JOIN tags t ON t.id = pt.tag_id WHERE t.slug = ?){}",
                    base, order
                );
                sqlx::query(&sql)
                    .bind(tag_slug)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, Some(category_id)) => {
                let sql = format!(
                    "{} AND p.id IN (SELECT pc.page_id FROM page_categories pc \
                     WHERE pc.category_id = ?){}",
                    base, order
                );
                sqlx::query(&sql)
                    .bind(category_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, None) => {
                let sql = format!("{}{}", base, order);
                sqlx::query(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(map_page).collect()
    }

    async fn count_blog_posts(&self, filter: &BlogPostFilter) -> Result<i64> {
        let base = "SELECT COUNT(*) FROM pages p \
                    WHERE p.kind IN ('article', 'video') AND p.live = 1";

        let row: (i64,) = match (&filter.tag_slug, filter.category_id) {
            (Some(tag_slug), _) => {
                let sql = format!(
                    "{} AND p.id IN (SELECT pt.page_id FROM page_tags pt \
                     JOIN tags t ON t.id = pt.tag_id WHERE t.slug = ?)",
                    base
                );
                sqlx::query_as(&sql)
                    .bind(tag_slug)
                    .fetch_one(&self.pool)
                    .await?
            }
            (None, Some(category_id)) => {
                let sql = format!(
                    "{} AND p.id IN (SELECT pc.page_id FROM page_categories pc \
                     WHERE pc.category_id = ?)",
                    base
                );
                sqlx::query_as(&sql)
                    .bind(category_id)
                    .fetch_one(&self.pool)
                    .await?
            }
            (None, None) => sqlx::query_as(base).fetch_one(&self.pool).await?,
        };
        Ok(row.0)
    }

    async fn search_live(&self, query: &str, limit: i64, offset: i64) -> Result<Vec<Page>> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pages WHERE live = 1 AND (title LIKE ? OR details LIKE ?) \
             ORDER BY first_published_at IS NULL, first_published_at DESC LIMIT ? OFFSET ?",
            PAGE_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_page).collect()
    }

    async fn count_search(&self, query: &str) -> Result<i64> {
        let pattern = format!("%{}%", query);
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM pages WHERE live = 1 AND (title LIKE ? OR details LIKE ?)",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn url_path(&self, id: i64) -> Result<Option<String>> {
        let mut current = match self.get_by_id(id).await? {
            Some(page) => page,
            None => return Ok(None),
        };

        let mut slugs = Vec::new();
        while let Some(parent_id) = current.parent_id {
            slugs.push(current.slug.clone());
            current = self
                .get_by_id(parent_id)
                .await?
                .context("Broken parent chain")?;
        }

        if slugs.is_empty() {
            return Ok(Some("/".to_string()));
        }
        slugs.reverse();
        Ok(Some(format!("/{}/", slugs.join("/"))))
    }

    async fn set_tags(&self, page_id: i64, names: &[String]) -> Result<()> {
        sqlx::query("DELETE FROM page_tags WHERE page_id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await?;

        for name in names {
            let slug = crate::services::generate_slug(name);
            sqlx::query("INSERT INTO tags (name, slug) VALUES (?, ?) ON CONFLICT(slug) DO NOTHING")
                .bind(name)
                .bind(&slug)
                .execute(&self.pool)
                .await?;
            let tag_id: (i64,) = sqlx::query_as("SELECT id FROM tags WHERE slug = ?")
                .bind(&slug)
                .fetch_one(&self.pool)
                .await?;
            sqlx::query("INSERT OR IGNORE INTO page_tags (page_id, tag_id) VALUES (?, ?)")
                .bind(page_id)
                .bind(tag_id.0)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn tags_for(&self, page_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.name, t.slug FROM tags t \
             JOIN page_tags pt ON pt.tag_id = t.id WHERE pt.page_id = ? ORDER BY t.name",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                name: row.get("name"),
                slug: row.get("slug"),
            })
            .collect())
    }

    async fn set_categories(&self, page_id: i64, category_ids: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM page_categories WHERE page_id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        for category_id in category_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO page_categories (page_id, category_id) VALUES (?, ?)",
            )
            .bind(page_id)
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn categories_for(&self, page_id: i64) -> Result<Vec<BlogCategory>> {
        let rows = sqlx::query(
            "SELECT c.id, c.name, c.slug, c.created_at FROM categories c \
             JOIN page_categories pc ON pc.category_id = c.id \
             WHERE pc.page_id = ? ORDER BY c.name",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| BlogCategory {
                id: row.get("id"),
                name: row.get("name"),
                slug: row.get("slug"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn set_authors(&self, page_id: i64, author_ids: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM page_authors WHERE page_id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await?;
        for (sort_order, author_id) in author_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO page_authors (page_id, author_id, sort_order) VALUES (?, ?, ?)",
            )
            .bind(page_id)
            .bind(author_id)
            .bind(sort_order as i64)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn authors_for(&self, page_id: i64) -> Result<Vec<PageAuthor>> {
        let rows = sqlx::query(
            "SELECT a.id, a.name, a.website, a.image_id, a.created_at, pa.sort_order \
             FROM authors a JOIN page_authors pa ON pa.author_id = a.id \
             WHERE pa.page_id = ? ORDER BY pa.sort_order",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| PageAuthor {
                author: BlogAuthor {
                    id: row.get("id"),
                    name: row.get("name"),
                    website: row.get("website"),
                    image_id: row.get("image_id"),
                    created_at: row.get("created_at"),
                },
                sort_order: row.get("sort_order"),
            })
            .collect())
    }
}
