//! Image and document records
//!
//! Binary storage is out of scope: rows reference already-hosted files by
//! path and carry the metadata the API projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image in the media library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub title: String,
    /// URL or path of the hosted file
    pub file: String,
    pub width: i64,
    pub height: i64,
    pub created_at: DateTime<Utc>,
}

impl Image {
    pub fn new(title: String, file: String, width: i64, height: i64) -> Self {
        Self {
            id: 0,
            title,
            file,
            width,
            height,
            created_at: Utc::now(),
        }
    }
}

/// A document in the media library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    /// URL or path of the hosted file
    pub file: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: String, file: String) -> Self {
        Self {
            id: 0,
            title,
            file,
            created_at: Utc::now(),
        }
    }
}
