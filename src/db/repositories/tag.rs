//! Tag repository
//!
//! Tag rows are created lazily when pages are tagged; this repository covers
//! the read side (tag lists for filter links) plus housekeeping.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Tag;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// All tags attached to at least one live page, ordered by name
    async fn list_used(&self) -> Result<Vec<Tag>>;

    async fn list(&self) -> Result<Vec<Tag>>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based tag repository
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

fn map_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, slug FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_tag))
    }

    async fn list_used(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT t.id, t.name, t.slug
            FROM tags t
            JOIN page_tags pt ON pt.tag_id = t.id
            JOIN pages p ON p.id = pt.page_id
            WHERE p.live = 1
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_tag).collect())
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_tag).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?;
        Ok(())
    }
}
