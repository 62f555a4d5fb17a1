//! End-to-end builds against an in-memory content store.

use std::{collections::HashSet, fs};

use async_trait::async_trait;
use spacetraveling_cms::{
    AdjacentPost, CmsError, ContentClient, Cursor, Direction, MemoryStore, PostPage, Result,
};
use spacetraveling_core::{Config, PostDocument};
use spacetraveling_generator::Builder;
use tempfile::TempDir;

const FIXTURES: &str = r#"{
    "posts": [
        {
            "id": "YFbA",
            "uid": "como-utilizar-hooks",
            "first_publication_date": "2021-03-15T19:25:28Z",
            "title": "Como utilizar Hooks",
            "subtitle": "Pensando em sincronização em vez de ciclos de vida",
            "author": "Joseph Oliveira",
            "banner_url": "https://images.prismic.io/spacetraveling/banner.png?auto=compress,format",
            "content": [
                {
                    "heading": "Proin et varius",
                    "body": [
                        {"type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [
                            {"start": 0, "end": 5, "type": "strong"}
                        ]}
                    ]
                }
            ]
        },
        {
            "id": "YFbB",
            "uid": "criando-um-app-cra-do-zero",
            "first_publication_date": "2021-03-20T10:00:00Z",
            "last_publication_date": "2021-03-21T13:45:00Z",
            "title": "Criando um app CRA do zero",
            "subtitle": "Tudo sobre como criar a sua primeira aplicação",
            "author": "Danilo Vieira",
            "content": [{"heading": "Introdução", "body": [{"type": "list-item", "text": "um"}]}]
        },
        {
            "id": "YFbC",
            "uid": "terceiro-post",
            "first_publication_date": "2021-03-25T08:00:00Z",
            "title": "Terceiro post",
            "subtitle": "",
            "author": "Autora"
        }
    ]
}"#;

fn config() -> Config {
    Config::new("spacetraveling", "https://spacetraveling.example.com", "memory")
}

fn store() -> MemoryStore {
    MemoryStore::from_json(FIXTURES).unwrap()
}

#[tokio::test]
async fn builds_listing_and_posts() {
    let dir = TempDir::new().unwrap();
    let store = store();

    let stats = Builder::new(config(), &store, dir.path()).build().await.unwrap();

    assert_eq!(stats.list_pages, 2);
    assert_eq!(stats.posts, 3);
    assert_eq!(stats.skipped, 0);

    let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.contains("Terceiro post"));
    assert!(index.contains("Criando um app CRA do zero"));
    assert!(!index.contains("Como utilizar Hooks"));
    assert!(index.contains(r#"href="/page/2""#));

    let page2 = fs::read_to_string(dir.path().join("page/2/index.html")).unwrap();
    assert!(page2.contains("Como utilizar Hooks"));
    assert!(!page2.contains("Carregar mais posts"));

    let hooks = fs::read_to_string(dir.path().join("post/como-utilizar-hooks/index.html")).unwrap();
    assert!(hooks.contains("<title>Como utilizar Hooks</title>"));
    assert!(hooks.contains("banner.png?auto=compress,format&amp;q=75"));
    assert!(hooks.contains("<strong>Lorem</strong> ipsum dolor sit amet"));
    assert!(hooks.contains("15 mar 2021"));
    assert!(hooks.contains("1 min"));
    // Oldest post: only a link to the newer one.
    assert!(!hooks.contains("Post anterior"));
    assert!(hooks.contains(r#"href="/post/criando-um-app-cra-do-zero" class="next""#));

    let cra = fs::read_to_string(dir.path().join("post/criando-um-app-cra-do-zero/index.html"))
        .unwrap();
    assert!(cra.contains("* editado em 21 mar 2021, às 13:45"));
    assert!(cra.contains("<ul>\n<li>um</li>\n</ul>"));
    assert!(cra.contains(r#"href="/post/como-utilizar-hooks" class="previous""#));
    assert!(cra.contains(r#"href="/post/terceiro-post" class="next""#));

    assert!(dir.path().join("404.html").exists());
}

/// Wraps a store and fails selected operations.
struct Flaky {
    inner: MemoryStore,
    fail_uids: HashSet<&'static str>,
    fail_paths: bool,
    fail_cursor: bool,
}

impl Flaky {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_uids: HashSet::new(),
            fail_paths: false,
            fail_cursor: false,
        }
    }
}

fn outage() -> CmsError {
    CmsError::Status {
        status: 503,
        url: "https://repo.cdn.prismic.io/api/v2".to_string(),
    }
}

#[async_trait]
impl ContentClient for Flaky {
    async fn query_posts(&self, page: u32, page_size: u32) -> Result<PostPage> {
        self.inner.query_posts(page, page_size).await
    }

    async fn fetch_cursor(&self, cursor: &Cursor) -> Result<PostPage> {
        if self.fail_cursor {
            return Err(outage());
        }
        self.inner.fetch_cursor(cursor).await
    }

    async fn query_uids(&self, page_size: u32) -> Result<Vec<String>> {
        if self.fail_paths {
            return Err(outage());
        }
        self.inner.query_uids(page_size).await
    }

    async fn get_by_uid(&self, uid: &str, reference: Option<&str>) -> Result<PostDocument> {
        if self.fail_uids.contains(uid) {
            return Err(outage());
        }
        self.inner.get_by_uid(uid, reference).await
    }

    async fn get_by_id(&self, id: &str, reference: Option<&str>) -> Result<PostDocument> {
        self.inner.get_by_id(id, reference).await
    }

    async fn adjacent(
        &self,
        document_id: &str,
        direction: Direction,
    ) -> Result<Option<AdjacentPost>> {
        self.inner.adjacent(document_id, direction).await
    }

    async fn has_ref(&self, reference: &str) -> Result<bool> {
        self.inner.has_ref(reference).await
    }
}

#[tokio::test]
async fn failing_post_is_skipped() {
    let dir = TempDir::new().unwrap();
    let mut client = Flaky::new(store());
    client.fail_uids.insert("terceiro-post");

    let stats = Builder::new(config(), &client, dir.path()).build().await.unwrap();

    assert_eq!(stats.posts, 2);
    assert_eq!(stats.skipped, 1);
    assert!(!dir.path().join("post/terceiro-post").exists());
    assert!(dir.path().join("post/como-utilizar-hooks/index.html").exists());
}

#[tokio::test]
async fn failing_paths_query_builds_no_posts() {
    let dir = TempDir::new().unwrap();
    let mut client = Flaky::new(store());
    client.fail_paths = true;

    let stats = Builder::new(config(), &client, dir.path()).build().await.unwrap();

    assert_eq!(stats.posts, 0);
    assert_eq!(stats.skipped, 0);
    assert!(dir.path().join("index.html").exists());
    assert!(!dir.path().join("post").exists());
}

#[tokio::test]
async fn failing_cursor_stops_listing() {
    let dir = TempDir::new().unwrap();
    let mut client = Flaky::new(store());
    client.fail_cursor = true;

    let stats = Builder::new(config(), &client, dir.path()).build().await.unwrap();

    assert_eq!(stats.list_pages, 1);
    assert_eq!(stats.posts, 3);
    assert!(!dir.path().join("page/2").exists());
}

#[tokio::test]
async fn builds_through_trait_object() {
    let dir = TempDir::new().unwrap();
    let store = store();
    let client: &dyn ContentClient = &store;

    let stats = Builder::new(config(), client, dir.path()).build().await.unwrap();
    assert_eq!(stats.posts, 3);
}
