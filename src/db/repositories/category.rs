//! Category snippet repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::BlogCategory;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &BlogCategory) -> Result<BlogCategory>;
    async fn get_by_id(&self, id: i64) -> Result<Option<BlogCategory>>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>>;
    async fn list(&self) -> Result<Vec<BlogCategory>>;
    async fn update(&self, category: &BlogCategory) -> Result<BlogCategory>;
    async fn delete(&self, id: i64) -> Result<()>;
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

fn map_category(row: &sqlx::sqlite::SqliteRow) -> BlogCategory {
    BlogCategory {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &BlogCategory) -> Result<BlogCategory> {
        let result =
            sqlx::query("INSERT INTO categories (name, slug, created_at) VALUES (?, ?, ?)")
                .bind(&category.name)
                .bind(&category.slug)
                .bind(category.created_at)
                .execute(&self.pool)
                .await
                .context("Failed to insert category")?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted category not found")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogCategory>> {
        let row = sqlx::query("SELECT id, name, slug, created_at FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_category))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>> {
        let row = sqlx::query("SELECT id, name, slug, created_at FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_category))
    }

    async fn list(&self) -> Result<Vec<BlogCategory>> {
        let rows = sqlx::query("SELECT id, name, slug, created_at FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_category).collect())
    }

    async fn update(&self, category: &BlogCategory) -> Result<BlogCategory> {
        sqlx::query("UPDATE categories SET name = ?, slug = ? WHERE id = ?")
            .bind(&category.name)
            .bind(&category.slug)
            .bind(category.id)
            .execute(&self.pool)
            .await
            .context("Failed to update category")?;
        self.get_by_id(category.id)
            .await?
            .context("Updated category not found")
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlitePool, Arc<dyn CategoryRepository>) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        (pool.clone(), SqlxCategoryRepository::boxed(pool))
    }

    #[tokio::test]
    async fn category_exists_without_any_page() {
        let (_pool, repo) = setup().await;
        let created = repo
            .create(&BlogCategory::new("News".to_string(), "news".to_string()))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(repo.exists_by_slug("news").await.unwrap());
        assert!(!repo.exists_by_slug("missing").await.unwrap());
    }

    #[tokio::test]
    async fn get_by_slug_resolves() {
        let (_pool, repo) = setup().await;
        repo.create(&BlogCategory::new("News".to_string(), "news".to_string()))
            .await
            .unwrap();
        let found = repo.get_by_slug("news").await.unwrap().unwrap();
        assert_eq!(found.name, "News");
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_category_removes_only_references() {
        let (pool, repo) = setup().await;
        let category = repo
            .create(&BlogCategory::new("News".to_string(), "news".to_string()))
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO pages (parent_id, position, kind, title, slug, live, details) \
             VALUES (NULL, 0, 'article', 'Post', 'post', 1, '{\"kind\":\"article\"}')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO page_categories (page_id, category_id) VALUES (1, ?)")
            .bind(category.id)
            .execute(&pool)
            .await
            .unwrap();

        repo.delete(category.id).await.unwrap();

        let refs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM page_categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(refs.0, 0);
        let pages: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(pages.0, 1);
    }
}
