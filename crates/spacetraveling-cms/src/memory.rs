//! In-process content store.
//!
//! Keeps published posts in an index sorted by first publication date, so
//! adjacency is a direct predecessor/successor lookup. Preview releases are
//! stored as document overrides keyed by reference. Used for offline builds
//! from a fixtures file and for tests.

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use serde::Deserialize;
use spacetraveling_core::PostDocument;
use tracing::debug;

use crate::{
    client::{AdjacentPost, ContentClient, Cursor, Direction, PostPage},
    error::{CmsError, Result},
};

const CURSOR_PREFIX: &str = "memory:";

/// Fixture file contents.
#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    /// Published posts, in any order.
    #[serde(default)]
    pub posts: Vec<PostDocument>,

    /// Preview releases: reference to the documents it changes.
    #[serde(default)]
    pub previews: HashMap<String, Vec<PostDocument>>,
}

/// Content store held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    /// Published posts, oldest first.
    index: Vec<PostDocument>,
    previews: HashMap<String, Vec<PostDocument>>,
}

impl MemoryStore {
    /// Create a store from published posts.
    pub fn new(posts: impl IntoIterator<Item = PostDocument>) -> Self {
        let mut store = Self::default();
        for post in posts {
            store.publish(post);
        }
        store
    }

    /// Load a store from a JSON fixtures document.
    pub fn from_json(json: &str) -> Result<Self> {
        let fixtures: Fixtures = serde_json::from_str(json)?;
        let mut store = Self::new(fixtures.posts);
        for (reference, documents) in fixtures.previews {
            for document in documents {
                store.add_preview(&reference, document);
            }
        }
        Ok(store)
    }

    /// Load a store from a JSON fixtures file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CmsError::Decode(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Publish a post, replacing any post with the same id.
    pub fn publish(&mut self, post: PostDocument) {
        self.index.retain(|p| p.id != post.id);
        let key = sort_key(&post);
        let at = self
            .index
            .partition_point(|p| sort_key(p) <= key);
        self.index.insert(at, post);
    }

    /// Register a document version visible only under `reference`.
    pub fn add_preview(&mut self, reference: &str, document: PostDocument) {
        self.previews
            .entry(reference.to_string())
            .or_default()
            .push(document);
    }

    /// Number of published posts.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no post is published.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Published posts, newest first (listing order).
    fn listing(&self) -> impl Iterator<Item = &PostDocument> {
        self.index.iter().rev()
    }

    fn page(&self, page: u32, page_size: u32) -> PostPage {
        let page = page.max(1) as usize;
        let size = page_size.max(1) as usize;
        let start = (page - 1) * size;

        let results = self
            .listing()
            .skip(start)
            .take(size)
            .map(PostDocument::summary)
            .collect();

        let next_page = (start + size < self.index.len())
            .then(|| Cursor::new(format!("{CURSOR_PREFIX}page={}&pageSize={size}", page + 1)));

        PostPage { results, next_page }
    }

    fn find(
        &self,
        reference: Option<&str>,
        matches: impl Fn(&PostDocument) -> bool,
    ) -> Option<PostDocument> {
        let preview = reference
            .and_then(|r| self.previews.get(r))
            .and_then(|docs| docs.iter().find(|d| matches(d)));

        preview
            .or_else(|| self.index.iter().find(|d| matches(d)))
            .cloned()
    }
}

fn sort_key(post: &PostDocument) -> (Option<chrono::DateTime<chrono::Utc>>, &str) {
    (post.first_publication_date, post.id.as_str())
}

fn parse_cursor(cursor: &Cursor) -> Result<(u32, u32)> {
    let invalid = || CmsError::InvalidCursor(cursor.to_string());
    let query = cursor.as_str().strip_prefix(CURSOR_PREFIX).ok_or_else(invalid)?;

    let mut page = None;
    let mut size = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("page", v)) => page = v.parse().ok(),
            Some(("pageSize", v)) => size = v.parse().ok(),
            _ => return Err(invalid()),
        }
    }

    page.zip(size).ok_or_else(invalid)
}

#[async_trait]
impl ContentClient for MemoryStore {
    async fn query_posts(&self, page: u32, page_size: u32) -> Result<PostPage> {
        Ok(self.page(page, page_size))
    }

    async fn fetch_cursor(&self, cursor: &Cursor) -> Result<PostPage> {
        let (page, page_size) = parse_cursor(cursor)?;
        Ok(self.page(page, page_size))
    }

    async fn query_uids(&self, page_size: u32) -> Result<Vec<String>> {
        Ok(self
            .listing()
            .take(page_size as usize)
            .map(|p| p.uid.clone())
            .collect())
    }

    async fn get_by_uid(&self, uid: &str, reference: Option<&str>) -> Result<PostDocument> {
        debug!(uid, ?reference, "memory lookup");
        self.find(reference, |d| d.uid == uid)
            .ok_or_else(|| CmsError::NotFound(uid.to_string()))
    }

    async fn get_by_id(&self, id: &str, reference: Option<&str>) -> Result<PostDocument> {
        self.find(reference, |d| d.id == id)
            .ok_or_else(|| CmsError::NotFound(id.to_string()))
    }

    async fn adjacent(
        &self,
        document_id: &str,
        direction: Direction,
    ) -> Result<Option<AdjacentPost>> {
        let Some(position) = self.index.iter().position(|p| p.id == document_id) else {
            return Ok(None);
        };

        let neighbour = match direction {
            Direction::Descending => position.checked_sub(1).map(|i| &self.index[i]),
            Direction::Ascending => self.index.get(position + 1),
        };

        Ok(neighbour.map(|p| AdjacentPost {
            uid: p.uid.clone(),
            title: Some(p.title.clone()),
        }))
    }

    async fn has_ref(&self, reference: &str) -> Result<bool> {
        Ok(self.previews.contains_key(reference))
    }
}
