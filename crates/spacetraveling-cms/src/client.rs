//! The content client contract.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spacetraveling_core::{PostDocument, PostSummary};

use crate::error::Result;

/// Opaque pagination cursor returned by a list query.
///
/// Cursors are handed back to the client that produced them, unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a cursor string received from the store.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw cursor string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One page of a post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    /// Posts in store order.
    pub results: Vec<PostSummary>,

    /// Cursor for the following page; `None` when the listing is exhausted.
    pub next_page: Option<Cursor>,
}

/// Publication-date ordering for adjacency queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Newest first; the post after the cursor is the one published just before it.
    Descending,
    /// Oldest first; the post after the cursor is the one published just after it.
    Ascending,
}

/// A neighbouring post as returned by the store, before title checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacentPost {
    pub uid: String,
    pub title: Option<String>,
}

/// Read access to the post repository.
///
/// Every method is a single request/response exchange with the store; there is
/// no retry. Document fetches take an optional preview reference: `None` reads
/// published content.
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// First page of the post listing.
    async fn query_posts(&self, page: u32, page_size: u32) -> Result<PostPage>;

    /// Follow a cursor returned by an earlier listing.
    async fn fetch_cursor(&self, cursor: &Cursor) -> Result<PostPage>;

    /// Uids of posts to prerender, at most `page_size` of them.
    async fn query_uids(&self, page_size: u32) -> Result<Vec<String>>;

    /// Full document by uid.
    async fn get_by_uid(&self, uid: &str, reference: Option<&str>) -> Result<PostDocument>;

    /// Full document by store id.
    async fn get_by_id(&self, id: &str, reference: Option<&str>) -> Result<PostDocument>;

    /// The single post following `document_id` in the given ordering.
    async fn adjacent(&self, document_id: &str, direction: Direction)
    -> Result<Option<AdjacentPost>>;

    /// Whether `reference` names a release the store can serve.
    async fn has_ref(&self, reference: &str) -> Result<bool>;
}
