//! API field serializers
//!
//! Pure projections from entities to the flat shapes the read API exposes,
//! plus the stream projector that enriches content blocks (rendered rich
//! text, resolved link URLs, image metadata) for both the API and the
//! template layer. Missing optional relations serialize as absent, never
//! as errors.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use crate::blocks::ContentBlock;
use crate::db::repositories::{ImageRepository, PageRepository};
use crate::models::{Image, Page};
use crate::services::richtext;

/// image -> {url, title, width, height}
pub fn image_json(image: &Image) -> Value {
    json!({
        "url": image.file,
        "title": image.title,
        "width": image.width,
        "height": image.height,
    })
}

/// Ordered child pages -> [{id, title, slug, url}]
pub fn child_pages_json(children: &[(Page, String)]) -> Value {
    Value::Array(
        children
            .iter()
            .map(|(page, url)| {
                json!({
                    "id": page.id,
                    "title": page.title,
                    "slug": page.slug,
                    "url": url,
                })
            })
            .collect(),
    )
}

/// Linked page -> {id, title, first_published_at, owner?, slug, url}
///
/// Owner is null-safe: pages without one serialize it as null.
pub fn page_link_json(page: &Page, url: &str) -> Value {
    json!({
        "id": page.id,
        "title": page.title,
        "first_published_at": page.first_published_at.map(|dt| dt.to_rfc3339()),
        "owner": page.owner,
        "slug": page.slug,
        "url": url,
    })
}

/// Derived banner-title field on the home page; computed, never stored.
pub fn banner_title_display(banner_title: &str) -> String {
    format!("Banner Title Is: {}", banner_title)
}

/// Projects content streams into render- and API-ready JSON.
///
/// Enrichment per variant:
/// - richtext blocks gain `html`
/// - image blocks gain `image` (or null when the row is gone)
/// - link-bearing blocks gain `url` from the precedence rule
/// - card items gain `image` and `url` the same way
pub struct StreamProjector {
    pages: Arc<dyn PageRepository>,
    images: Arc<dyn ImageRepository>,
}

impl StreamProjector {
    pub fn new(pages: Arc<dyn PageRepository>, images: Arc<dyn ImageRepository>) -> Self {
        Self { pages, images }
    }

    /// Project a stream in order.
    pub async fn project(&self, blocks: &[ContentBlock]) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(blocks.len());
        for block in blocks {
            out.push(self.project_block(block).await?);
        }
        Ok(out)
    }

    async fn project_block(&self, block: &ContentBlock) -> Result<Value> {
        let value = match block {
            ContentBlock::TitleAndText(b) => json!({
                "title": b.title,
                "text": b.text,
            }),
            ContentBlock::FullRichtext(b) => json!({
                "source": b.source,
                "html": richtext::render_full(&b.source),
            }),
            ContentBlock::SimpleRichtext(b) => json!({
                "source": b.source,
                "html": richtext::render_simple(&b.source),
            }),
            ContentBlock::Cards(b) => {
                let mut cards = Vec::with_capacity(b.cards.len());
                for card in &b.cards {
                    cards.push(json!({
                        "title": card.title,
                        "text": card.text,
                        "image": self.image_or_null(Some(card.image_id)).await?,
                        "url": self.resolve_link(&card.link).await?,
                    }));
                }
                json!({ "title": b.title, "cards": cards })
            }
            ContentBlock::Cta(b) => json!({
                "title": b.title,
                "text": richtext::render_simple(&b.text),
                "button_text": b.button_text,
                "url": self.resolve_link(&b.link).await?,
            }),
            ContentBlock::Button(b) => json!({
                "url": self.resolve_link(&b.link).await?,
            }),
            ContentBlock::Image(b) => json!({
                "image": self.image_or_null(Some(b.image_id)).await?,
            }),
            ContentBlock::CharBlock(b) => json!({
                "value": b.value,
            }),
        };

        Ok(json!({
            "type": block.tag(),
            "template": block.template(),
            "value": value,
        }))
    }

    /// Resolve a block link with internal-page precedence.
    pub async fn resolve_link(&self, link: &crate::blocks::LinkTarget) -> Result<Option<Value>> {
        if link.is_empty() {
            return Ok(None);
        }
        if let Some(page_id) = link.page_id {
            if let Some(url) = self.pages.url_path(page_id).await? {
                return Ok(Some(Value::String(url)));
            }
        }
        Ok(link.url.clone().map(Value::String))
    }

    /// Image projection or null when the id is unset or stale.
    pub async fn image_or_null(&self, image_id: Option<i64>) -> Result<Value> {
        match image_id {
            Some(id) => Ok(self
                .images
                .get_by_id(id)
                .await?
                .map(|image| image_json(&image))
                .unwrap_or(Value::Null)),
            None => Ok(Value::Null),
        }
    }
}
