//! Blog author snippet
//!
//! Authors live outside the page tree and are referenced from blog posts
//! through an ordered join table. Deleting an author drops only the
//! references; deleting an author's image nulls the image reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog author snippet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogAuthor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    /// Portrait image; SET NULL when the image is deleted
    #[serde(default)]
    pub image_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl BlogAuthor {
    pub fn new(name: String, website: Option<String>, image_id: Option<i64>) -> Self {
        Self {
            id: 0,
            name,
            website,
            image_id,
            created_at: Utc::now(),
        }
    }
}

/// An author reference attached to a blog post, in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAuthor {
    pub author: BlogAuthor,
    pub sort_order: i64,
}
