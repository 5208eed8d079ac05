//! Page model and the page-type registry
//!
//! Every content item lives in a single tree: one parent per page, ordered
//! siblings. Typed page data (banner fields, content streams, video URL and
//! so on) is a tagged `PageDetails` union stored as JSON on the page row.
//! Which kinds may nest under which is a static capability table on
//! `PageKind`, checked at creation time rather than through inheritance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blocks::ContentBlock;

/// Carousel bounds on the home page
pub const CAROUSEL_MIN: usize = 1;
pub const CAROUSEL_MAX: usize = 5;

/// Author bounds on blog posts
pub const AUTHORS_MIN: usize = 1;
pub const AUTHORS_MAX: usize = 4;

/// Page kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    BlogListing,
    Article,
    Video,
    Flex,
    Contact,
}

impl PageKind {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::BlogListing => "blog_listing",
            PageKind::Article => "article",
            PageKind::Video => "video",
            PageKind::Flex => "flex",
            PageKind::Contact => "contact",
        }
    }

    /// Parse from the database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "home" => Some(PageKind::Home),
            "blog_listing" => Some(PageKind::BlogListing),
            "article" => Some(PageKind::Article),
            "video" => Some(PageKind::Video),
            "flex" => Some(PageKind::Flex),
            "contact" => Some(PageKind::Contact),
            _ => None,
        }
    }

    /// Kinds allowed directly under a page of this kind
    pub fn allowed_children(&self) -> &'static [PageKind] {
        match self {
            PageKind::Home => &[PageKind::BlogListing, PageKind::Flex, PageKind::Contact],
            PageKind::BlogListing => &[PageKind::Article, PageKind::Video],
            PageKind::Flex => &[PageKind::Flex, PageKind::Contact],
            PageKind::Article | PageKind::Video | PageKind::Contact => &[],
        }
    }

    /// Kinds a page of this kind may nest under; `None` in a slot means the
    /// kind may sit at the tree root.
    pub fn allowed_parents(&self) -> &'static [Option<PageKind>] {
        match self {
            PageKind::Home => &[None],
            PageKind::BlogListing => &[Some(PageKind::Home)],
            PageKind::Article | PageKind::Video => &[Some(PageKind::BlogListing)],
            PageKind::Flex => &[Some(PageKind::Home), Some(PageKind::Flex)],
            PageKind::Contact => &[Some(PageKind::Home), Some(PageKind::Flex)],
        }
    }

    /// Whether this kind may be created under the given parent kind
    /// (`None` = tree root). Both directions of the table must agree.
    pub fn can_nest_under(&self, parent: Option<PageKind>) -> bool {
        let parent_side = match parent {
            Some(kind) => kind.allowed_children().contains(self),
            None => true,
        };
        parent_side && self.allowed_parents().contains(&parent)
    }

    /// Article and video pages form the blog-post family
    pub fn is_blog_post(&self) -> bool {
        matches!(self, PageKind::Article | PageKind::Video)
    }

    /// Kinds limited to a single instance in the whole tree
    pub fn max_count(&self) -> Option<u32> {
        match self {
            PageKind::BlogListing => Some(1),
            _ => None,
        }
    }

    /// Tera template rendering this kind
    pub fn template(&self) -> &'static str {
        match self {
            PageKind::Home => "home/home_page.html",
            PageKind::BlogListing => "blog/blog_listing_page.html",
            PageKind::Article => "blog/article_blog_page.html",
            PageKind::Video => "blog/video_blog_page.html",
            PageKind::Flex => "flex/flex_page.html",
            PageKind::Contact => "contact/contact_page.html",
        }
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields shared by article and video posts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogFields {
    pub custom_title: String,
    /// Image-only stream shown above the post
    #[serde(default)]
    pub banner_images: Vec<ContentBlock>,
    /// Post body stream
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Home page fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeDetails {
    pub banner_title: String,
    /// Simple rich text source
    pub banner_subtitle: String,
    #[serde(default)]
    pub banner_image_id: Option<i64>,
    /// Optional internal page the banner links to
    #[serde(default)]
    pub banner_cta_page_id: Option<i64>,
    /// Ordered carousel, 1..=5 image ids
    #[serde(default)]
    pub carousel_image_ids: Vec<i64>,
    /// CTA-only stream
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Article post fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDetails {
    #[serde(flatten)]
    pub blog: BlogFields,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Image-only stream shown inline at the top of the article
    #[serde(default)]
    pub intro_images: Vec<ContentBlock>,
}

/// Video post fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    #[serde(flatten)]
    pub blog: BlogFields,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Flex page fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexDetails {
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Unrestricted stream
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Blog listing fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogListingDetails {
    pub custom_title: String,
}

/// Kind-specific page payload, stored as JSON on the page row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageDetails {
    Home(HomeDetails),
    BlogListing(BlogListingDetails),
    Article(ArticleDetails),
    Video(VideoDetails),
    Flex(FlexDetails),
    Contact,
}

impl PageDetails {
    /// The kind this payload belongs to
    pub fn kind(&self) -> PageKind {
        match self {
            PageDetails::Home(_) => PageKind::Home,
            PageDetails::BlogListing(_) => PageKind::BlogListing,
            PageDetails::Article(_) => PageKind::Article,
            PageDetails::Video(_) => PageKind::Video,
            PageDetails::Flex(_) => PageKind::Flex,
            PageDetails::Contact => PageKind::Contact,
        }
    }

    /// Shared blog fields for article/video posts
    pub fn blog_fields(&self) -> Option<&BlogFields> {
        match self {
            PageDetails::Article(d) => Some(&d.blog),
            PageDetails::Video(d) => Some(&d.blog),
            _ => None,
        }
    }
}

/// A page in the content tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    /// `None` only for the tree root
    pub parent_id: Option<i64>,
    /// Position among siblings (0-indexed)
    pub position: i64,
    pub kind: PageKind,
    pub title: String,
    pub slug: String,
    /// Whether the page is visible in listings, search, and the API
    pub live: bool,
    pub first_published_at: Option<DateTime<Utc>>,
    /// Username of the page owner, when known
    pub owner: Option<String>,
    pub details: PageDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(parent_id: Option<i64>, title: String, slug: String, details: PageDetails) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // set by the database
            parent_id,
            position: 0,
            kind: details.kind(),
            title,
            slug,
            live: false,
            first_published_at: None,
            owner: None,
            details,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePageInput {
    pub parent_id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub details: PageDetails,
    /// Publish immediately
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub owner: Option<String>,
    /// Tag names, blog posts only
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category ids, blog posts only
    #[serde(default)]
    pub category_ids: Vec<i64>,
    /// Ordered author ids, blog posts only (1..=4)
    #[serde(default)]
    pub author_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            PageKind::Home,
            PageKind::BlogListing,
            PageKind::Article,
            PageKind::Video,
            PageKind::Flex,
            PageKind::Contact,
        ] {
            assert_eq!(PageKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(PageKind::from_str("gallery"), None);
    }

    #[test]
    fn capability_table_matches_both_directions() {
        assert!(PageKind::BlogListing.can_nest_under(Some(PageKind::Home)));
        assert!(PageKind::Article.can_nest_under(Some(PageKind::BlogListing)));
        assert!(PageKind::Video.can_nest_under(Some(PageKind::BlogListing)));
        assert!(PageKind::Flex.can_nest_under(Some(PageKind::Flex)));
        assert!(PageKind::Flex.can_nest_under(Some(PageKind::Home)));
        assert!(PageKind::Home.can_nest_under(None));

        assert!(!PageKind::Article.can_nest_under(Some(PageKind::Home)));
        assert!(!PageKind::Home.can_nest_under(Some(PageKind::Flex)));
        assert!(!PageKind::BlogListing.can_nest_under(None));
        assert!(!PageKind::Contact.can_nest_under(Some(PageKind::BlogListing)));
    }

    #[test]
    fn details_kind_agreement() {
        let details = PageDetails::Article(ArticleDetails::default());
        assert_eq!(details.kind(), PageKind::Article);
        assert!(details.blog_fields().is_some());

        let details = PageDetails::Flex(FlexDetails::default());
        assert_eq!(details.kind(), PageKind::Flex);
        assert!(details.blog_fields().is_none());
    }

    #[test]
    fn details_serde_is_kind_tagged() {
        let details = PageDetails::Video(VideoDetails {
            blog: BlogFields {
                custom_title: "Launch video".to_string(),
                ..Default::default()
            },
            video_url: Some("https://youtu.be/x".to_string()),
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "video");
        assert_eq!(json["custom_title"], "Launch video");
        let back: PageDetails = serde_json::from_value(json).unwrap();
        assert_eq!(back, details);
    }
}
