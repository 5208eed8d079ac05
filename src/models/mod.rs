//! Data models
//!
//! Entities stored by the database layer (pages, snippets, media, settings)
//! plus the pagination types shared by listings and the read API.

mod author;
mod category;
mod image;
mod page;
mod pagination;
mod settings;
mod tag;

pub use author::{BlogAuthor, PageAuthor};
pub use category::BlogCategory;
pub use image::{Document, Image};
pub use page::{
    ArticleDetails, BlogFields, BlogListingDetails, CreatePageInput, FlexDetails, HomeDetails,
    Page, PageDetails, PageKind, VideoDetails, AUTHORS_MAX, AUTHORS_MIN, CAROUSEL_MAX,
    CAROUSEL_MIN,
};
pub use pagination::{resolve_page, total_pages, ListParams, PagedResult};
pub use settings::SocialMediaSettings;
pub use tag::Tag;
