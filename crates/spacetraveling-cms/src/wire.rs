//! Prismic REST API response shapes and their conversion to post types.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use spacetraveling_core::{ContentSection, PostDocument, PostSummary, content::null_as_default};

use crate::{
    client::{AdjacentPost, Cursor, PostPage},
    error::{CmsError, Result},
};

/// API root: lists the content releases.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRoot {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master: bool,
}

impl ApiRoot {
    pub fn master_ref(&self) -> Result<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master)
            .map(|r| r.reference.as_str())
            .ok_or(CmsError::MissingMasterRef)
    }
}

/// A search response.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<WireDocument>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireDocument {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: WirePostData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WirePostData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub banner: Option<WireImage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireImage {
    #[serde(default)]
    pub url: Option<String>,
}

/// Parse a Prismic timestamp such as `2021-03-25T19:25:28+0000`.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn timestamp(value: Option<&str>, field: &str, id: &str) -> Option<DateTime<Utc>> {
    let value = value?;
    let parsed = parse_timestamp(value);
    if parsed.is_none() {
        tracing::warn!(document = id, field, value, "ignoring unparseable timestamp");
    }
    parsed
}

impl WireDocument {
    fn uid(&self) -> Result<String> {
        self.uid
            .clone()
            .ok_or_else(|| CmsError::Decode(format!("document {} has no uid", self.id)))
    }

    pub fn into_summary(self) -> Result<PostSummary> {
        let uid = self.uid()?;
        Ok(PostSummary {
            first_publication_date: timestamp(
                self.first_publication_date.as_deref(),
                "first_publication_date",
                &self.id,
            ),
            uid,
            title: self.data.title.unwrap_or_default(),
            subtitle: self.data.subtitle.unwrap_or_default(),
            author: self.data.author.unwrap_or_default(),
        })
    }

    pub fn into_document(self) -> Result<PostDocument> {
        let uid = self.uid()?;
        Ok(PostDocument {
            first_publication_date: timestamp(
                self.first_publication_date.as_deref(),
                "first_publication_date",
                &self.id,
            ),
            last_publication_date: timestamp(
                self.last_publication_date.as_deref(),
                "last_publication_date",
                &self.id,
            ),
            id: self.id,
            uid,
            title: self.data.title.unwrap_or_default(),
            subtitle: self.data.subtitle.unwrap_or_default(),
            author: self.data.author.unwrap_or_default(),
            banner_url: self
                .data
                .banner
                .and_then(|b| b.url)
                .filter(|url| !url.is_empty()),
            content: self.data.content,
        })
    }

    pub fn into_adjacent(self) -> Result<AdjacentPost> {
        Ok(AdjacentPost {
            uid: self.uid()?,
            title: self.data.title,
        })
    }
}

impl SearchResponse {
    pub fn into_page(self) -> Result<PostPage> {
        let results = self
            .results
            .into_iter()
            .map(WireDocument::into_summary)
            .collect::<Result<Vec<_>>>()?;

        Ok(PostPage {
            results,
            next_page: self.next_page.filter(|n| !n.is_empty()).map(Cursor::new),
        })
    }
}
