//! Structured text to HTML.
//!
//! Consecutive list items are grouped into a single `<ul>`/`<ol>`. Span
//! offsets count UTF-16 code units, as the content store produces them, and
//! are clamped to the block text. Embeds are not rendered.

use spacetraveling_core::{BlockKind, RichTextBlock, SpanKind};
use tracing::debug;

use crate::html::escape_html;

/// Render a sequence of blocks to an HTML fragment.
pub fn render(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = list_tag(block.kind);
        if list != open_list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{tag}>\n"));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{tag}>\n"));
            }
            open_list = list;
        }
        render_block(block, &mut html);
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{tag}>\n"));
    }

    html
}

fn list_tag(kind: BlockKind) -> Option<&'static str> {
    match kind {
        BlockKind::ListItem => Some("ul"),
        BlockKind::OListItem => Some("ol"),
        _ => None,
    }
}

fn render_block(block: &RichTextBlock, html: &mut String) {
    let tag = match block.kind {
        BlockKind::Paragraph | BlockKind::Other => "p",
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Heading4 => "h4",
        BlockKind::Heading5 => "h5",
        BlockKind::Heading6 => "h6",
        BlockKind::ListItem | BlockKind::OListItem => "li",
        BlockKind::Preformatted => {
            let inner = inline(&block.text, block, false);
            html.push_str(&format!("<pre>{inner}</pre>\n"));
            return;
        }
        BlockKind::Image => {
            if let Some(url) = block.url.as_deref() {
                let alt = block.alt.as_deref().unwrap_or_default();
                html.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" loading="lazy" /></p>"#,
                    escape_html(url),
                    escape_html(alt)
                ));
                html.push('\n');
            }
            return;
        }
        BlockKind::Embed => {
            debug!("skipping embed block");
            return;
        }
    };

    let inner = inline(&block.text, block, true);
    html.push_str(&format!("<{tag}>{inner}</{tag}>\n"));
}

/// A span resolved to byte offsets into the block text.
struct Resolved<'a> {
    start: usize,
    end: usize,
    kind: &'a SpanKind,
}

fn inline(text: &str, block: &RichTextBlock, line_breaks: bool) -> String {
    let mut spans: Vec<Resolved<'_>> = block
        .spans
        .iter()
        .map(|span| Resolved {
            start: byte_index(text, span.start),
            end: byte_index(text, span.end),
            kind: &span.kind,
        })
        .filter(|span| span.start < span.end && open_tag(span.kind).is_some())
        .collect();

    // Outer spans open first.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut boundaries: Vec<usize> = spans
        .iter()
        .flat_map(|span| [span.start, span.end])
        .chain([0, text.len()])
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut html = String::new();
    for window in boundaries.windows(2) {
        let (from, to) = (window[0], window[1]);
        let active: Vec<&Resolved<'_>> = spans
            .iter()
            .filter(|span| span.start <= from && span.end >= to)
            .collect();

        for span in &active {
            if let Some(tag) = open_tag(span.kind) {
                html.push_str(&tag);
            }
        }
        html.push_str(&escape_text(&text[from..to], line_breaks));
        for span in active.iter().rev() {
            html.push_str(close_tag(span.kind));
        }
    }

    html
}

/// Byte offset of the character at `utf16_offset`, clamped to the text.
fn byte_index(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if units >= utf16_offset {
            return index;
        }
        units += ch.len_utf16();
    }
    text.len()
}

fn open_tag(kind: &SpanKind) -> Option<String> {
    match kind {
        SpanKind::Strong => Some("<strong>".to_string()),
        SpanKind::Em => Some("<em>".to_string()),
        SpanKind::Hyperlink { url } if is_external(url) => Some(format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
            escape_html(url)
        )),
        SpanKind::Hyperlink { url } if is_safe_relative(url) => {
            Some(format!(r#"<a href="{}">"#, escape_html(url)))
        }
        SpanKind::Label { label } => Some(format!(r#"<span class="{}">"#, escape_html(label))),
        SpanKind::Hyperlink { .. } | SpanKind::Other(_) => None,
    }
}

fn close_tag(kind: &SpanKind) -> &'static str {
    match kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink { .. } => "</a>",
        SpanKind::Label { .. } => "</span>",
        SpanKind::Other(_) => "",
    }
}

fn is_external(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
}

fn is_safe_relative(url: &str) -> bool {
    (url.starts_with('/') && !url.starts_with("//")) || url.starts_with('#')
}

fn escape_text(text: &str, line_breaks: bool) -> String {
    let escaped = escape_html(text);
    if line_breaks {
        escaped.replace('\n', "<br />")
    } else {
        escaped
    }
}
