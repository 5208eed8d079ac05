//! Rich text rendering
//!
//! Rich text sources are markdown, rendered to HTML with pulldown-cmark at
//! view and serialization time. Two feature sets exist:
//! - full: the complete extension set (tables, strikethrough, task lists)
//! - simple: emphasis, strong, and links only; everything else renders as
//!   plain paragraph text

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

/// Render markdown with the full feature set.
pub fn render_full(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);

    let parser = Parser::new_ext(source, options);
    let mut output = String::with_capacity(source.len() * 2);
    html::push_html(&mut output, parser);
    output
}

/// Render markdown restricted to bold, italic, and links.
///
/// Disallowed structure (headings, lists, images, code blocks) is flattened:
/// its text content survives, the markup does not.
pub fn render_simple(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::empty());
    let filtered = parser.filter_map(|event| match event {
        Event::Start(ref tag) => match tag {
            Tag::Paragraph | Tag::Emphasis | Tag::Strong | Tag::Link { .. } => Some(event),
            _ => None,
        },
        Event::End(tag_end) => match tag_end {
            TagEnd::Paragraph | TagEnd::Emphasis | TagEnd::Strong | TagEnd::Link => {
                Some(Event::End(tag_end))
            }
            _ => None,
        },
        Event::Text(_) | Event::SoftBreak | Event::HardBreak => Some(event),
        Event::Code(code) => Some(Event::Text(code)),
        _ => None,
    });

    let mut output = String::with_capacity(source.len() * 2);
    html::push_html(&mut output, filtered);
    output
}
