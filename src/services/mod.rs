//! Services layer - Business logic
//!
//! Services coordinate repositories, the cache port, and validation:
//! - `PageService`: tree capability checks, page creation/save, path resolution
//! - `BlogService`: paginated listing contexts and category views
//! - `SearchService`: query over live pages
//! - `SettingsService`: per-site settings singleton
//! - `richtext`: markdown rendering for rich text blocks

pub mod blog;
pub mod page;
pub mod richtext;
pub mod search;
pub mod settings;

pub use blog::{BlogListingContext, BlogService, BLOG_PAGE_SIZE};
pub use page::{PageService, PageServiceError};
pub use richtext::{render_full, render_simple};
pub use search::{SearchService, SEARCH_PAGE_SIZE};
pub use settings::SettingsService;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Build a URL-friendly slug from a name or title.
pub fn generate_slug(input: &str) -> String {
    let lower = input.to_lowercase();
    NON_SLUG
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
