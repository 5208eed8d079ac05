//! Tag model

use serde::{Deserialize, Serialize};

/// A tag attached to blog posts via a join table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}
