//! Content block library
//!
//! A page's content is an ordered, heterogeneous stream of typed blocks.
//! `ContentBlock` is a closed tagged union over the supported variants; each
//! variant validates its own payload and names the tera template that renders
//! it. Streams are stored as JSON (`[{"type": ..., "value": ...}, ...]`) on
//! the owning page row, so adding a variant is a local change to this module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for a card title
const CARD_TITLE_MAX: usize = 40;
/// Maximum length for card body text
const CARD_TEXT_MAX: usize = 200;
/// Maximum length for a call-to-action title
const CTA_TITLE_MAX: usize = 60;
/// Maximum length for button label text
const BUTTON_TEXT_MAX: usize = 40;
/// Bounds for the standalone char block
const CHAR_BLOCK_MIN: usize = 10;
const CHAR_BLOCK_MAX: usize = 50;

/// Validation errors for content blocks
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("Field '{field}' exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Field '{field}' must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("Block '{block}' needs at least one item")]
    EmptyList { block: &'static str },

    #[error("Block type '{0}' is not allowed in this stream")]
    NotAllowedHere(&'static str),
}

/// Link carried by button-bearing blocks.
///
/// Either side may be set. Resolution prefers the internal page: when both a
/// page and an external URL are present, the page wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkTarget {
    /// Internal page id; takes precedence when set
    #[serde(default)]
    pub page_id: Option<i64>,
    /// External URL, used only when no page is set
    #[serde(default)]
    pub url: Option<String>,
}

impl LinkTarget {
    /// Resolve the link to a concrete URL.
    ///
    /// `page_url_of` maps a page id to its tree URL; it returns `None` for
    /// pages that no longer exist, in which case the external URL (if any)
    /// is used instead.
    pub fn resolve<F>(&self, page_url_of: F) -> Option<String>
    where
        F: Fn(i64) -> Option<String>,
    {
        if let Some(page_id) = self.page_id {
            if let Some(url) = page_url_of(page_id) {
                return Some(url);
            }
        }
        self.url.clone()
    }

    /// Whether neither side of the link is set
    pub fn is_empty(&self) -> bool {
        self.page_id.is_none() && self.url.is_none()
    }
}

/// Title and text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleAndTextBlock {
    pub title: String,
    pub text: String,
}

/// Rich text block; the source is markdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    pub source: String,
}

/// A single card inside a [`CardsBlock`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardItem {
    pub image_id: i64,
    pub title: String,
    pub text: String,
    /// Optional button; the page link takes precedence over the URL
    #[serde(default)]
    pub link: LinkTarget,
}

/// Card grid block: a heading plus one or more cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardsBlock {
    pub title: String,
    pub cards: Vec<CardItem>,
}

/// Call-to-action block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtaBlock {
    pub title: String,
    /// Simple rich text (markdown, restricted feature set)
    pub text: String,
    #[serde(default = "default_button_text")]
    pub button_text: String,
    #[serde(default)]
    pub link: LinkTarget,
}

fn default_button_text() -> String {
    "Learn More".to_string()
}

/// Standalone button block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonBlock {
    #[serde(default)]
    pub link: LinkTarget,
}

/// Single image block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub image_id: i64,
}

/// Single line of plain text, 10..=50 characters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharBlock {
    pub value: String,
}

/// A typed content block.
///
/// Serialized form is internally tagged: `{"type": "cta", "value": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    TitleAndText(TitleAndTextBlock),
    FullRichtext(RichTextBlock),
    SimpleRichtext(RichTextBlock),
    Cards(CardsBlock),
    Cta(CtaBlock),
    Button(ButtonBlock),
    Image(ImageBlock),
    CharBlock(CharBlock),
}

impl ContentBlock {
    /// Stable tag name, matching the serialized `type` field
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TitleAndText(_) => "title_and_text",
            Self::FullRichtext(_) => "full_richtext",
            Self::SimpleRichtext(_) => "simple_richtext",
            Self::Cards(_) => "cards",
            Self::Cta(_) => "cta",
            Self::Button(_) => "button",
            Self::Image(_) => "image",
            Self::CharBlock(_) => "char_block",
        }
    }

    /// Tera template that renders this block
    pub fn template(&self) -> &'static str {
        match self {
            Self::TitleAndText(_) => "streams/title_and_text_block.html",
            Self::FullRichtext(_) | Self::SimpleRichtext(_) => "streams/richtext_block.html",
            Self::Cards(_) => "streams/card_block.html",
            Self::Cta(_) => "streams/cta_block.html",
            Self::Button(_) => "streams/button_block.html",
            Self::Image(_) => "streams/image_block.html",
            Self::CharBlock(_) => "streams/char_block.html",
        }
    }

    /// Validate the block payload
    pub fn validate(&self) -> Result<(), BlockError> {
        match self {
            Self::TitleAndText(b) => {
                require(&b.title, "title")?;
                require(&b.text, "text")
            }
            Self::FullRichtext(b) | Self::SimpleRichtext(b) => require(&b.source, "source"),
            Self::Cards(b) => {
                require(&b.title, "title")?;
                if b.cards.is_empty() {
                    return Err(BlockError::EmptyList { block: "cards" });
                }
                for card in &b.cards {
                    require(&card.title, "title")?;
                    max_len(&card.title, "title", CARD_TITLE_MAX)?;
                    require(&card.text, "text")?;
                    max_len(&card.text, "text", CARD_TEXT_MAX)?;
                }
                Ok(())
            }
            Self::Cta(b) => {
                require(&b.title, "title")?;
                max_len(&b.title, "title", CTA_TITLE_MAX)?;
                require(&b.text, "text")?;
                require(&b.button_text, "button_text")?;
                max_len(&b.button_text, "button_text", BUTTON_TEXT_MAX)
            }
            Self::Button(_) => Ok(()),
            Self::Image(_) => Ok(()),
            Self::CharBlock(b) => {
                let len = b.value.chars().count();
                if len < CHAR_BLOCK_MIN {
                    return Err(BlockError::TooShort {
                        field: "value",
                        min: CHAR_BLOCK_MIN,
                    });
                }
                max_len(&b.value, "value", CHAR_BLOCK_MAX)
            }
        }
    }

}

/// Where a stream is attached; constrains which variants it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamContext {
    /// Home page content: call-to-action blocks only
    HomeContent,
    /// Blog post body: title+text, full richtext, image
    BlogContent,
    /// Banner / intro streams: images only
    ImageStream,
    /// Flex page content: every variant
    FlexContent,
}

impl StreamContext {
    fn allows(&self, block: &ContentBlock) -> bool {
        match self {
            Self::HomeContent => matches!(block, ContentBlock::Cta(_)),
            Self::BlogContent => matches!(
                block,
                ContentBlock::TitleAndText(_)
                    | ContentBlock::FullRichtext(_)
                    | ContentBlock::Image(_)
            ),
            Self::ImageStream => matches!(block, ContentBlock::Image(_)),
            Self::FlexContent => true,
        }
    }
}

/// Validate an ordered stream against its attachment context.
pub fn validate_stream(blocks: &[ContentBlock], context: StreamContext) -> Result<(), BlockError> {
    for block in blocks {
        if !context.allows(block) {
            return Err(BlockError::NotAllowedHere(block.tag()));
        }
        block.validate()?;
    }
    Ok(())
}

fn require(value: &str, field: &'static str) -> Result<(), BlockError> {
    if value.trim().is_empty() {
        return Err(BlockError::MissingField(field));
    }
    Ok(())
}

fn max_len(value: &str, field: &'static str, max: usize) -> Result<(), BlockError> {
    if value.chars().count() > max {
        return Err(BlockError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn url_of(id: i64) -> Option<String> {
        match id {
            1 => Some("/".to_string()),
            7 => Some("/blog/".to_string()),
            _ => None,
        }
    }

    #[test]
    fn link_page_wins_over_url() {
        let link = LinkTarget {
            page_id: Some(7),
            url: Some("https://example.com".to_string()),
        };
        assert_eq!(link.resolve(url_of), Some("/blog/".to_string()));
    }

    #[test]
    fn link_url_used_without_page() {
        let link = LinkTarget {
            page_id: None,
            url: Some("https://example.com".to_string()),
        };
        assert_eq!(link.resolve(url_of), Some("https://example.com".to_string()));
    }

    #[test]
    fn link_absent_when_neither_set() {
        assert_eq!(LinkTarget::default().resolve(url_of), None);
    }

    #[test]
    fn link_falls_back_when_page_is_gone() {
        // Page 99 does not resolve; the external URL is the fallback.
        let link = LinkTarget {
            page_id: Some(99),
            url: Some("https://example.com".to_string()),
        };
        assert_eq!(link.resolve(url_of), Some("https://example.com".to_string()));
    }

    #[test]
    fn serde_tag_round_trip() {
        let block = ContentBlock::Cta(CtaBlock {
            title: "Read more".to_string(),
            text: "All our *latest* posts".to_string(),
            button_text: "Learn More".to_string(),
            link: LinkTarget {
                page_id: Some(7),
                url: None,
            },
        });
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "cta");
        assert_eq!(json["value"]["title"], "Read more");
        let back: ContentBlock = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let json = serde_json::json!({"type": "marquee", "value": {}});
        assert!(serde_json::from_value::<ContentBlock>(json).is_err());
    }

    #[test]
    fn cta_default_button_text() {
        let json = serde_json::json!({
            "type": "cta",
            "value": {"title": "Hi", "text": "there"}
        });
        let block: ContentBlock = serde_json::from_value(json).unwrap();
        match block {
            ContentBlock::Cta(cta) => assert_eq!(cta.button_text, "Learn More"),
            other => panic!("expected cta, got {:?}", other),
        }
    }

    #[test]
    fn card_title_length_enforced() {
        let block = ContentBlock::Cards(CardsBlock {
            title: "Team".to_string(),
            cards: vec![CardItem {
                image_id: 1,
                title: "x".repeat(41),
                text: "short".to_string(),
                link: LinkTarget::default(),
            }],
        });
        assert_eq!(
            block.validate(),
            Err(BlockError::TooLong {
                field: "title",
                max: 40
            })
        );
    }

    #[test]
    fn cards_require_at_least_one_item() {
        let block = ContentBlock::Cards(CardsBlock {
            title: "Team".to_string(),
            cards: vec![],
        });
        assert_eq!(block.validate(), Err(BlockError::EmptyList { block: "cards" }));
    }

    #[test]
    fn char_block_bounds() {
        let short = ContentBlock::CharBlock(CharBlock {
            value: "too short".to_string(),
        });
        assert_eq!(
            short.validate(),
            Err(BlockError::TooShort {
                field: "value",
                min: 10
            })
        );
        let ok = ContentBlock::CharBlock(CharBlock {
            value: "just long enough".to_string(),
        });
        assert_eq!(ok.validate(), Ok(()));
    }

    #[test]
    fn home_content_rejects_non_cta() {
        let stream = vec![ContentBlock::Button(ButtonBlock::default())];
        assert_eq!(
            validate_stream(&stream, StreamContext::HomeContent),
            Err(BlockError::NotAllowedHere("button"))
        );
    }

    #[test]
    fn flex_content_accepts_everything() {
        let stream = vec![
            ContentBlock::TitleAndText(TitleAndTextBlock {
                title: "Hello".to_string(),
                text: "world".to_string(),
            }),
            ContentBlock::Button(ButtonBlock::default()),
            ContentBlock::Image(ImageBlock { image_id: 3 }),
        ];
        assert!(validate_stream(&stream, StreamContext::FlexContent).is_ok());
    }

    proptest! {
        // Whatever the external URL is, a resolvable page link wins.
        #[test]
        fn prop_page_link_precedence(url in proptest::option::of("[a-z:/.]{1,30}")) {
            let link = LinkTarget { page_id: Some(1), url };
            prop_assert_eq!(link.resolve(url_of), Some("/".to_string()));
        }

        // Without a page link the external URL passes through unchanged.
        #[test]
        fn prop_url_passthrough(url in "[a-z:/.]{1,30}") {
            let link = LinkTarget { page_id: None, url: Some(url.clone()) };
            prop_assert_eq!(link.resolve(url_of), Some(url));
        }
    }
}
