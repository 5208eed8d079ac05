//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod author;
pub mod category;
pub mod media;
pub mod page;
pub mod settings;
pub mod tag;

pub use author::{AuthorRepository, SqlxAuthorRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use media::{
    DocumentRepository, ImageRepository, SqlxDocumentRepository, SqlxImageRepository,
};
pub use page::{BlogPostFilter, PageRepository, SqlxPageRepository};
pub use settings::{SettingsRepository, SqlxSettingsRepository};
pub use tag::{SqlxTagRepository, TagRepository};
