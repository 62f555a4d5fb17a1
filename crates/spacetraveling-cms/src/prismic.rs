//! Prismic REST API client.
//!
//! Every query is a `GET {endpoint}/documents/search` with a `ref` naming the
//! content release to read. Published content uses the master ref listed at the
//! API root; preview sessions pass their own ref instead.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use spacetraveling_core::{PostDocument, config::CmsConfig};
use tracing::debug;

use crate::{
    client::{AdjacentPost, ContentClient, Cursor, Direction, PostPage},
    error::{CmsError, Result},
    wire::{ApiRoot, SearchResponse, WireDocument},
};

/// HTTP client for a Prismic repository.
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    document_type: String,
}

impl PrismicClient {
    /// Create a client from configuration.
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            document_type: config.document_type.clone(),
        })
    }

    /// The API root this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.http.get(url).query(params);
        // `next_page` URLs come back with the token already in them.
        if let Some(token) = &self.access_token
            && !has_query_param(url, "access_token")
        {
            request = request.query(&[("access_token", token)]);
        }

        debug!(url, "cms request");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CmsError::Decode(e.to_string()))
    }

    /// Ref of the currently published release.
    pub async fn master_ref(&self) -> Result<String> {
        let root: ApiRoot = self.get_json(&self.endpoint, &[]).await?;
        root.master_ref().map(str::to_string)
    }

    async fn resolve_ref(&self, reference: Option<&str>) -> Result<String> {
        match reference {
            Some(r) => Ok(r.to_string()),
            None => self.master_ref().await,
        }
    }

    async fn search(&self, params: Vec<(&str, String)>) -> Result<SearchResponse> {
        let url = format!("{}/documents/search", self.endpoint);
        self.get_json(&url, &params).await
    }

    fn type_predicate(&self) -> String {
        predicate_at("document.type", &self.document_type)
    }

    fn fetch_fields(&self, fields: &[&str]) -> String {
        fields
            .iter()
            .map(|f| format!("{}.{f}", self.document_type))
            .collect::<Vec<_>>()
            .join(",")
    }

    async fn single(
        &self,
        predicate: String,
        reference: Option<&str>,
        key: &str,
    ) -> Result<PostDocument> {
        let reference = self.resolve_ref(reference).await?;
        let response = self
            .search(vec![
                ("ref", reference),
                ("q", format!("[{predicate}]")),
                ("pageSize", "1".to_string()),
            ])
            .await?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound(key.to_string()))
            .and_then(WireDocument::into_document)
    }
}

fn has_query_param(url: &str, name: &str) -> bool {
    url.split_once('?').is_some_and(|(_, query)| {
        query
            .split('&')
            .any(|pair| pair.split_once('=').map_or(pair, |(key, _)| key) == name)
    })
}

/// `[at(path,"value")]` predicate with the value quoted.
fn predicate_at(path: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[at({path},\"{escaped}\")]")
}

fn ordering(direction: Direction) -> &'static str {
    match direction {
        Direction::Descending => "[document.first_publication_date desc]",
        Direction::Ascending => "[document.first_publication_date]",
    }
}

#[async_trait]
impl ContentClient for PrismicClient {
    async fn query_posts(&self, page: u32, page_size: u32) -> Result<PostPage> {
        let reference = self.master_ref().await?;
        let response = self
            .search(vec![
                ("ref", reference),
                ("q", format!("[{}]", self.type_predicate())),
                (
                    "fetch",
                    self.fetch_fields(&["title", "subtitle", "uid", "author"]),
                ),
                ("page", page.max(1).to_string()),
                ("pageSize", page_size.to_string()),
            ])
            .await?;

        response.into_page()
    }

    async fn fetch_cursor(&self, cursor: &Cursor) -> Result<PostPage> {
        let url = cursor.as_str();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CmsError::InvalidCursor(url.to_string()));
        }

        let response: SearchResponse = self.get_json(url, &[]).await?;
        response.into_page()
    }

    async fn query_uids(&self, page_size: u32) -> Result<Vec<String>> {
        let reference = self.master_ref().await?;
        let response = self
            .search(vec![
                ("ref", reference),
                ("q", format!("[{}]", self.type_predicate())),
                ("fetch", self.fetch_fields(&["uid"])),
                ("pageSize", page_size.to_string()),
            ])
            .await?;

        Ok(response
            .results
            .into_iter()
            .filter_map(|doc| doc.uid)
            .collect())
    }

    async fn get_by_uid(&self, uid: &str, reference: Option<&str>) -> Result<PostDocument> {
        let path = format!("my.{}.uid", self.document_type);
        self.single(predicate_at(&path, uid), reference, uid).await
    }

    async fn get_by_id(&self, id: &str, reference: Option<&str>) -> Result<PostDocument> {
        self.single(predicate_at("document.id", id), reference, id)
            .await
    }

    async fn adjacent(
        &self,
        document_id: &str,
        direction: Direction,
    ) -> Result<Option<AdjacentPost>> {
        let reference = self.master_ref().await?;
        let response = self
            .search(vec![
                ("ref", reference),
                ("q", format!("[{}]", self.type_predicate())),
                ("fetch", self.fetch_fields(&["uid", "title"])),
                ("pageSize", "1".to_string()),
                ("after", document_id.to_string()),
                ("orderings", ordering(direction).to_string()),
            ])
            .await?;

        response
            .results
            .into_iter()
            .next()
            .map(WireDocument::into_adjacent)
            .transpose()
    }

    async fn has_ref(&self, reference: &str) -> Result<bool> {
        let lookup = self
            .search(vec![
                ("ref", reference.to_string()),
                ("q", format!("[{}]", self.type_predicate())),
                ("fetch", self.fetch_fields(&["uid"])),
                ("pageSize", "1".to_string()),
            ])
            .await;

        match lookup {
            Ok(_) => Ok(true),
            // Prismic answers unknown or expired refs with a client error.
            Err(CmsError::Status {
                status: 400 | 404, ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
