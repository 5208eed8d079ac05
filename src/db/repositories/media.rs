//! Media repositories: images and documents

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Document, Image};

/// Image repository trait
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn create(&self, image: &Image) -> Result<Image>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Image>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Image>>;
    async fn count(&self) -> Result<i64>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Document repository trait
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &Document) -> Result<Document>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Document>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Document>>;
    async fn count(&self) -> Result<i64>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based image repository
pub struct SqlxImageRepository {
    pool: SqlitePool,
}

impl SqlxImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn ImageRepository> {
        Arc::new(Self::new(pool))
    }
}

fn map_image(row: &sqlx::sqlite::SqliteRow) -> Image {
    Image {
        id: row.get("id"),
        title: row.get("title"),
        file: row.get("file"),
        width: row.get("width"),
        height: row.get("height"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ImageRepository for SqlxImageRepository {
    async fn create(&self, image: &Image) -> Result<Image> {
        let result = sqlx::query(
            "INSERT INTO images (title, file, width, height, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&image.title)
        .bind(&image.file)
        .bind(image.width)
        .bind(image.height)
        .bind(image.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert image")?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted image not found")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Image>> {
        let row = sqlx::query(
            "SELECT id, title, file, width, height, created_at FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_image))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Image>> {
        let rows = sqlx::query(
            "SELECT id, title, file, width, height, created_at FROM images \
             ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_image).collect())
    }

    async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete image")?;
        Ok(())
    }
}

/// SQLx-based document repository
pub struct SqlxDocumentRepository {
    pool: SqlitePool,
}

impl SqlxDocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn DocumentRepository> {
        Arc::new(Self::new(pool))
    }
}

fn map_document(row: &sqlx::sqlite::SqliteRow) -> Document {
    Document {
        id: row.get("id"),
        title: row.get("title"),
        file: row.get("file"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl DocumentRepository for SqlxDocumentRepository {
    async fn create(&self, document: &Document) -> Result<Document> {
        let result =
            sqlx::query("INSERT INTO documents (title, file, created_at) VALUES (?, ?, ?)")
                .bind(&document.title)
                .bind(&document.file)
                .bind(document.created_at)
                .execute(&self.pool)
                .await
                .context("Failed to insert document")?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted document not found")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT id, title, file, created_at FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_document))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, title, file, created_at FROM documents ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_document).collect())
    }

    async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete document")?;
        Ok(())
    }
}
