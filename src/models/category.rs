//! Blog category snippet

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog category snippet: independent of the page tree, referenced from blog
/// posts many-to-many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogCategory {
    pub id: i64,
    pub name: String,
    /// Unique URL-friendly slug
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl BlogCategory {
    pub fn new(name: String, slug: String) -> Self {
        Self {
            id: 0,
            name,
            slug,
            created_at: Utc::now(),
        }
    }
}
