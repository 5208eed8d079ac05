//! Author snippet repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::BlogAuthor;

/// Author repository trait
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn create(&self, author: &BlogAuthor) -> Result<BlogAuthor>;
    async fn get_by_id(&self, id: i64) -> Result<Option<BlogAuthor>>;
    async fn list(&self) -> Result<Vec<BlogAuthor>>;
    async fn update(&self, author: &BlogAuthor) -> Result<BlogAuthor>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based author repository
pub struct SqlxAuthorRepository {
    pool: SqlitePool,
}

impl SqlxAuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn AuthorRepository> {
        Arc::new(Self::new(pool))
    }
}

fn map_author(row: &sqlx::sqlite::SqliteRow) -> BlogAuthor {
    BlogAuthor {
        id: row.get("id"),
        name: row.get("name"),
        website: row.get("website"),
        image_id: row.get("image_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl AuthorRepository for SqlxAuthorRepository {
    async fn create(&self, author: &BlogAuthor) -> Result<BlogAuthor> {
        let result = sqlx::query(
            "INSERT INTO authors (name, website, image_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&author.name)
        .bind(&author.website)
        .bind(author.image_id)
        .bind(author.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert author")?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted author not found")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogAuthor>> {
        let row = sqlx::query(
            "SELECT id, name, website, image_id, created_at FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_author))
    }

    async fn list(&self) -> Result<Vec<BlogAuthor>> {
        let rows =
            sqlx::query("SELECT id, name, website, image_id, created_at FROM authors ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(map_author).collect())
    }

    async fn update(&self, author: &BlogAuthor) -> Result<BlogAuthor> {
        sqlx::query("UPDATE authors SET name = ?, website = ?, image_id = ? WHERE id = ?")
            .bind(&author.name)
            .bind(&author.website)
            .bind(author.image_id)
            .bind(author.id)
            .execute(&self.pool)
            .await
            .context("Failed to update author")?;
        self.get_by_id(author.id)
            .await?
            .context("Updated author not found")
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete author")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlitePool, Arc<dyn AuthorRepository>) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        (pool.clone(), SqlxAuthorRepository::boxed(pool))
    }

    #[tokio::test]
    async fn author_exists_without_any_page() {
        let (_pool, repo) = setup().await;
        let created = repo
            .create(&BlogAuthor::new(
                "Ada".to_string(),
                Some("https://example.com".to_string()),
                None,
            ))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_changes_fields() {
        let (_pool, repo) = setup().await;
        let mut author = repo
            .create(&BlogAuthor::new("Ada".to_string(), None, None))
            .await
            .unwrap();
        author.website = Some("https://ada.dev".to_string());
        let updated = repo.update(&author).await.unwrap();
        assert_eq!(updated.website.as_deref(), Some("https://ada.dev"));
    }

    #[tokio::test]
    async fn deleting_an_author_removes_only_references() {
        let (pool, repo) = setup().await;
        let author = repo
            .create(&BlogAuthor::new("Ada".to_string(), None, None))
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO pages (parent_id, position, kind, title, slug, live, details) \
             VALUES (NULL, 0, 'article', 'Post', 'post', 1, '{\"kind\":\"article\"}')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO page_authors (page_id, author_id, sort_order) VALUES (1, ?, 0)")
            .bind(author.id)
            .execute(&pool)
            .await
            .unwrap();

        repo.delete(author.id).await.unwrap();

        let refs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM page_authors")
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

    #[tokio::test]
    async fn deleting_an_image_nulls_the_author_reference() {
        let (pool, repo) = setup().await;
        let image_id = sqlx::query(
            "INSERT INTO images (title, file, width, height) VALUES ('Portrait', 'p.jpg', 10, 10)",
        )
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let author = repo
            .create(&BlogAuthor::new("Ada".to_string(), None, Some(image_id)))
            .await
            .unwrap();

        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(image_id)
            .execute(&pool)
            .await
            .unwrap();

        let reloaded = repo.get_by_id(author.id).await.unwrap().unwrap();
        assert_eq!(reloaded.image_id, None);
    }
}
