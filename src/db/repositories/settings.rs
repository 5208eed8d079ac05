//! Site settings repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::SocialMediaSettings;

/// Settings repository trait
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// The settings row for a site, if one has been saved
    async fn get_for_site(&self, site: &str) -> Result<Option<SocialMediaSettings>>;

    /// Insert or replace the settings row for a site
    async fn upsert(&self, settings: &SocialMediaSettings) -> Result<SocialMediaSettings>;
}

/// SQLx-based settings repository
pub struct SqlxSettingsRepository {
    pool: SqlitePool,
}

impl SqlxSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn SettingsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SettingsRepository for SqlxSettingsRepository {
    async fn get_for_site(&self, site: &str) -> Result<Option<SocialMediaSettings>> {
        let row = sqlx::query(
            "SELECT site, facebook, twitter, youtube FROM site_settings WHERE site = ?",
        )
        .bind(site)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| SocialMediaSettings {
            site: row.get("site"),
            facebook: row.get("facebook"),
            twitter: row.get("twitter"),
            youtube: row.get("youtube"),
        }))
    }

    async fn upsert(&self, settings: &SocialMediaSettings) -> Result<SocialMediaSettings> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (site, facebook, twitter, youtube)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(site) DO UPDATE SET
                facebook = excluded.facebook,
                twitter = excluded.twitter,
                youtube = excluded.youtube
            "#,
        )
        .bind(&settings.site)
        .bind(&settings.facebook)
        .bind(&settings.twitter)
        .bind(&settings.youtube)
        .execute(&self.pool)
        .await
        .context("Failed to upsert site settings")?;

        self.get_for_site(&settings.site)
            .await?
            .context("Upserted settings not found")
    }
}
