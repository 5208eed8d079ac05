//! Site-wide settings
//!
//! One `SocialMediaSettings` row per site, keyed by the site name. All fields
//! are optional; a site with no row gets defaults.

use serde::{Deserialize, Serialize};

/// Social media settings for a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialMediaSettings {
    /// Site name this row belongs to
    pub site: String,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
}

impl SocialMediaSettings {
    /// Defaults for a site with no stored settings
    pub fn for_site(site: &str) -> Self {
        Self {
            site: site.to_string(),
            ..Default::default()
        }
    }
}
