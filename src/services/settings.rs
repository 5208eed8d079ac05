//! Settings service
//!
//! Per-site singleton for social media links. A site with no stored row
//! gets defaults; writing goes through an upsert.

use std::sync::Arc;

use anyhow::Result;

use crate::db::repositories::SettingsRepository;
use crate::models::SocialMediaSettings;

/// Settings service
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Settings for a site, falling back to empty defaults
    pub async fn for_site(&self, site: &str) -> Result<SocialMediaSettings> {
        Ok(self
            .repo
            .get_for_site(site)
            .await?
            .unwrap_or_else(|| SocialMediaSettings::for_site(site)))
    }

    /// Insert or replace a site's settings
    pub async fn upsert(&self, settings: &SocialMediaSettings) -> Result<SocialMediaSettings> {
        self.repo.upsert(settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSettingsRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SettingsService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SettingsService::new(SqlxSettingsRepository::boxed(pool))
    }

    #[tokio::test]
    async fn unset_site_gets_defaults() {
        let service = setup().await;
        let settings = service.for_site("example.com").await.unwrap();
        assert_eq!(settings.site, "example.com");
        assert_eq!(settings.facebook, None);
        assert_eq!(settings.twitter, None);
        assert_eq!(settings.youtube, None);
    }

    #[tokio::test]
    async fn upsert_is_one_row_per_site() {
        let service = setup().await;
        let mut settings = SocialMediaSettings::for_site("example.com");
        settings.twitter = Some("https://twitter.com/example".to_string());
        service.upsert(&settings).await.unwrap();

        settings.youtube = Some("https://youtube.com/@example".to_string());
        service.upsert(&settings).await.unwrap();

        let stored = service.for_site("example.com").await.unwrap();
        assert_eq!(
            stored.twitter,
            Some("https://twitter.com/example".to_string())
        );
        assert_eq!(
            stored.youtube,
            Some("https://youtube.com/@example".to_string())
        );

        // A different site is unaffected.
        let other = service.for_site("other.test").await.unwrap();
        assert_eq!(other.twitter, None);
    }
}
