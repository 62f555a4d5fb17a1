//! Post types as fetched from the content store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as the type's default.
///
/// Prismic sends `null` for text and group fields left empty in the editor.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Post fields shown on listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// URL slug of the post.
    pub uid: String,

    /// First publication date; absent for never-published previews.
    #[serde(default)]
    pub first_publication_date: Option<DateTime<Utc>>,

    /// Post title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Short subtitle shown under the title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,

    /// Author display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
}

/// A complete post ready for the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDocument {
    /// Content store document id, used as the navigation cursor.
    pub id: String,

    /// URL slug of the post.
    pub uid: String,

    /// First publication date.
    #[serde(default)]
    pub first_publication_date: Option<DateTime<Utc>>,

    /// Date of the latest edit.
    #[serde(default)]
    pub last_publication_date: Option<DateTime<Utc>>,

    /// Post title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Short subtitle, also used as the meta description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,

    /// Author display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,

    /// Banner image URL.
    #[serde(default)]
    pub banner_url: Option<String>,

    /// Ordered content sections.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentSection>,
}

impl PostDocument {
    /// Listing fields of this post.
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            uid: self.uid.clone(),
            first_publication_date: self.first_publication_date,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }

    /// Navigation link to this post, if it has a title to show.
    pub fn link(&self) -> Option<PostLink> {
        PostLink::new(&self.uid, &self.title)
    }
}

/// A heading followed by rich-text body blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    /// Section heading.
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,

    /// Rich-text body.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<RichTextBlock>,
}

impl ContentSection {
    /// Section with plain paragraph blocks, one per string.
    pub fn with_paragraphs(heading: impl Into<String>, paragraphs: &[&str]) -> Self {
        Self {
            heading: heading.into(),
            body: paragraphs
                .iter()
                .map(|text| RichTextBlock::paragraph(*text))
                .collect(),
        }
    }
}

/// Kind of a rich-text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    /// Block types this renderer does not know; rendered as paragraphs.
    #[serde(other)]
    Other,
}

/// One structured-text block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextBlock {
    /// Block type.
    #[serde(rename = "type")]
    pub kind: BlockKind,

    /// Plain text of the block.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,

    /// Inline formatting over `text`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,

    /// Image URL for image blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Image alt text for image blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl RichTextBlock {
    /// Plain paragraph without formatting.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    /// Block of the given kind without formatting.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
        }
    }

    /// Add an inline span.
    #[must_use]
    pub fn with_span(mut self, start: usize, end: usize, kind: SpanKind) -> Self {
        self.spans.push(Span { start, end, kind });
        self
    }
}

/// Inline formatting range over the block text, in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSpan", into = "RawSpan")]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

/// Inline formatting kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink { url: String },
    Label { label: String },
    Other(String),
}

#[derive(Serialize, Deserialize)]
struct RawSpan {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<RawSpanData>,
}

#[derive(Default, Serialize, Deserialize)]
struct RawSpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl From<RawSpan> for Span {
    fn from(raw: RawSpan) -> Self {
        let data = raw.data.unwrap_or_default();
        let kind = match raw.kind.as_str() {
            "strong" => SpanKind::Strong,
            "em" => SpanKind::Em,
            "hyperlink" => match data.url {
                Some(url) => SpanKind::Hyperlink { url },
                None => SpanKind::Other(raw.kind),
            },
            "label" => match data.label {
                Some(label) => SpanKind::Label { label },
                None => SpanKind::Other(raw.kind),
            },
            _ => SpanKind::Other(raw.kind),
        };

        Self {
            start: raw.start,
            end: raw.end,
            kind,
        }
    }
}

impl From<Span> for RawSpan {
    fn from(span: Span) -> Self {
        let (kind, data) = match span.kind {
            SpanKind::Strong => ("strong".to_string(), None),
            SpanKind::Em => ("em".to_string(), None),
            SpanKind::Hyperlink { url } => (
                "hyperlink".to_string(),
                Some(RawSpanData {
                    url: Some(url),
                    label: None,
                }),
            ),
            SpanKind::Label { label } => (
                "label".to_string(),
                Some(RawSpanData {
                    url: None,
                    label: Some(label),
                }),
            ),
            SpanKind::Other(kind) => (kind, None),
        };

        Self {
            start: span.start,
            end: span.end,
            kind,
            data,
        }
    }
}

/// Link to a neighbouring post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLink {
    pub uid: String,
    pub title: String,
}

impl PostLink {
    /// Build a link; posts without a title produce no link.
    pub fn new(uid: &str, title: &str) -> Option<Self> {
        if title.trim().is_empty() {
            return None;
        }
        Some(Self {
            uid: uid.to_string(),
            title: title.to_string(),
        })
    }
}

/// Previous/next posts around a post, by publication order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    /// The post published immediately before.
    pub previous: Option<PostLink>,

    /// The post published immediately after.
    pub next: Option<PostLink>,
}

impl Navigation {
    /// Whether there is nothing to link to.
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}
