//! Accumulating post listing with a "load more" cursor.
//!
//! The listing starts from the first page and grows by following the cursor
//! each page hands back. A failed fetch leaves the accumulated state exactly
//! as it was.

use std::future::Future;

use spacetraveling_cms::{CmsError, ContentClient, Cursor, PostPage};
use spacetraveling_core::PostSummary;
use tracing::debug;

/// Outcome of a load-more request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A page was fetched and this many posts were appended.
    Appended(usize),
    /// There was no next page; nothing was fetched.
    Exhausted,
}

/// Posts shown so far plus the cursor for the following page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    pub items: Vec<PostSummary>,
    pub next_cursor: Option<Cursor>,
}

impl PaginationState {
    /// State after the first page.
    pub fn from_page(page: PostPage) -> Self {
        Self {
            items: page.results,
            next_cursor: page.next_page,
        }
    }

    /// Whether a further page can be loaded.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Fetch the next page with `fetch_page` and append it.
    ///
    /// With no cursor this is a no-op. On error the state is unchanged.
    pub async fn load_more<F, Fut>(&mut self, fetch_page: F) -> Result<LoadMore, CmsError>
    where
        F: FnOnce(Cursor) -> Fut,
        Fut: Future<Output = Result<PostPage, CmsError>>,
    {
        let Some(cursor) = self.next_cursor.clone() else {
            return Ok(LoadMore::Exhausted);
        };

        let page = fetch_page(cursor).await?;
        let appended = page.results.len();
        self.items.extend(page.results);
        self.next_cursor = page.next_page;

        Ok(LoadMore::Appended(appended))
    }
}

/// A post listing driven by a content client.
pub struct ListAccumulator<'a, C: ContentClient + ?Sized> {
    client: &'a C,
    state: PaginationState,
    pages_loaded: usize,
}

impl<'a, C: ContentClient + ?Sized> ListAccumulator<'a, C> {
    /// Fetch the first page of the listing.
    pub async fn first_page(client: &'a C, page_size: u32) -> Result<Self, CmsError> {
        let page = client.query_posts(1, page_size).await?;
        debug!(
            posts = page.results.len(),
            more = page.next_page.is_some(),
            "loaded first page"
        );
        Ok(Self {
            client,
            state: PaginationState::from_page(page),
            pages_loaded: 1,
        })
    }

    /// Follow the cursor once.
    pub async fn load_more(&mut self) -> Result<LoadMore, CmsError> {
        let client = self.client;
        let outcome = self
            .state
            .load_more(|cursor| async move { client.fetch_cursor(&cursor).await })
            .await?;

        if let LoadMore::Appended(count) = outcome {
            self.pages_loaded += 1;
            debug!(appended = count, pages = self.pages_loaded, "loaded more posts");
        }
        Ok(outcome)
    }

    /// Keep loading until `pages` pages are loaded or the listing runs out.
    ///
    /// Returns the number of pages loaded in total.
    pub async fn load_pages(&mut self, pages: usize) -> Result<usize, CmsError> {
        while self.pages_loaded < pages {
            if self.load_more().await? == LoadMore::Exhausted {
                break;
            }
        }
        Ok(self.pages_loaded)
    }

    /// Current listing state.
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Consume the accumulator, keeping its state.
    pub fn into_state(self) -> PaginationState {
        self.state
    }

    /// Pages fetched so far, the first one included.
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }
}

#[cfg(test)]
mod tests {
    use spacetraveling_cms::MemoryStore;
    use spacetraveling_core::PostDocument;

    use super::*;

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: None,
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: String::new(),
        }
    }

    fn uids(state: &PaginationState) -> Vec<&str> {
        state.items.iter().map(|p| p.uid.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_more_appends_and_advances_cursor() {
        let mut state = PaginationState {
            items: vec![summary("p1"), summary("p2")],
            next_cursor: Some(Cursor::from("cursor-2")),
        };

        let outcome = state
            .load_more(|cursor| async move {
                assert_eq!(cursor.as_str(), "cursor-2");
                Ok::<_, CmsError>(PostPage {
                    results: vec![summary("p3")],
                    next_page: None,
                })
            })
            .await
            .unwrap();

        assert_eq!(outcome, LoadMore::Appended(1));
        assert_eq!(uids(&state), ["p1", "p2", "p3"]);
        assert!(!state.has_more());
    }

    #[tokio::test]
    async fn test_load_more_without_cursor_is_noop() {
        let mut state = PaginationState {
            items: vec![summary("p1")],
            next_cursor: None,
        };

        let outcome = state
            .load_more(|_| async { Err::<PostPage, _>(CmsError::Decode("fetched".to_string())) })
            .await
            .unwrap();

        assert_eq!(outcome, LoadMore::Exhausted);
        assert_eq!(uids(&state), ["p1"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_state_unchanged() {
        let mut state = PaginationState {
            items: vec![summary("p1"), summary("p2")],
            next_cursor: Some(Cursor::from("cursor-2")),
        };
        let before = state.clone();

        let err = state
            .load_more(|_| async { Err::<PostPage, _>(CmsError::Decode("truncated".to_string())) })
            .await
            .unwrap_err();

        assert!(matches!(err, CmsError::Decode(_)));
        assert_eq!(state, before);
    }

    fn store(count: u32) -> MemoryStore {
        MemoryStore::new((1..=count).map(|i| PostDocument {
            id: format!("{i}"),
            uid: format!("p{i}"),
            first_publication_date: chrono::DateTime::from_timestamp(i64::from(i) * 86_400, 0),
            last_publication_date: None,
            title: format!("Post {i}"),
            subtitle: String::new(),
            author: String::new(),
            banner_url: None,
            content: Vec::new(),
        }))
    }

    #[tokio::test]
    async fn test_accumulator_walks_all_pages() {
        let store = store(5);
        let mut list = ListAccumulator::first_page(&store, 2).await.unwrap();
        assert_eq!(uids(list.state()), ["p5", "p4"]);

        assert_eq!(list.load_more().await.unwrap(), LoadMore::Appended(2));
        assert_eq!(list.load_more().await.unwrap(), LoadMore::Appended(1));
        assert_eq!(list.load_more().await.unwrap(), LoadMore::Exhausted);
        assert_eq!(list.pages_loaded(), 3);

        let state = list.into_state();
        assert_eq!(uids(&state), ["p5", "p4", "p3", "p2", "p1"]);
        assert!(state.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_load_pages_stops_when_exhausted() {
        let store = store(3);
        let mut list = ListAccumulator::first_page(&store, 2).await.unwrap();
        assert_eq!(list.load_pages(10).await.unwrap(), 2);
        assert_eq!(list.state().items.len(), 3);

        let mut list = ListAccumulator::first_page(&store, 1).await.unwrap();
        assert_eq!(list.load_pages(2).await.unwrap(), 2);
        assert_eq!(uids(list.state()), ["p3", "p2"]);
        assert!(list.state().has_more());
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let store = store(0);
        let list = ListAccumulator::first_page(&store, 2).await.unwrap();
        assert!(list.state().items.is_empty());
        assert!(!list.state().has_more());
    }
}
