//! Inline markdown for field descriptions and labels.

use gpui::SharedString;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RichSpan {
    pub text: SharedString,
    pub style: SpanStyle,
    pub link: Option<SharedString>,
}

/// Flattens inline markdown into styled runs. Block structure is ignored:
/// paragraphs and breaks collapse into single spaces.
pub fn parse_inline(source: &str) -> Vec<RichSpan> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut spans: Vec<RichSpan> = Vec::new();
    let mut strong = 0usize;
    let mut emphasis = 0usize;
    let mut strikethrough = 0usize;
    let mut links: Vec<SharedString> = Vec::new();
    let mut pending_space = false;

    for event in Parser::new_ext(source, options) {
        let (text, code) = match event {
            Event::Start(tag) => {
                match tag {
                    Tag::Strong => strong += 1,
                    Tag::Emphasis => emphasis += 1,
                    Tag::Strikethrough => strikethrough += 1,
                    Tag::Link { dest_url, .. } => links.push(dest_url.to_string().into()),
                    Tag::Paragraph if !spans.is_empty() => pending_space = true,
                    _ => {}
                }
                continue;
            }
            Event::End(tag) => {
                match tag {
                    TagEnd::Strong => strong = strong.saturating_sub(1),
                    TagEnd::Emphasis => emphasis = emphasis.saturating_sub(1),
                    TagEnd::Strikethrough => strikethrough = strikethrough.saturating_sub(1),
                    TagEnd::Link => {
                        links.pop();
                    }
                    _ => {}
                }
                continue;
            }
            Event::Text(text) => (text.to_string(), false),
            Event::Code(text) => (text.to_string(), true),
            Event::SoftBreak | Event::HardBreak => {
                pending_space = !spans.is_empty();
                continue;
            }
            Event::Html(text) | Event::InlineHtml(text) => (text.to_string(), false),
            _ => continue,
        };

        let style = SpanStyle {
            strong: strong > 0,
            emphasis: emphasis > 0,
            strikethrough: strikethrough > 0,
            code,
        };
        let link = links.last().cloned();
        let text = if pending_space {
            pending_space = false;
            format!(" {text}")
        } else {
            text
        };

        match spans.last_mut() {
            Some(last) if last.style == style && last.link == link => {
                last.text = format!("{}{}", last.text, text).into();
            }
            _ => spans.push(RichSpan {
                text: text.into(),
                style,
                link,
            }),
        }
    }

    spans
}

/// Text with all markup removed.
pub fn plain_text(source: &str) -> String {
    parse_inline(source)
        .iter()
        .map(|span| span.text.as_ref())
        .collect()
}
