//! On-demand page rendering.
//!
//! ## Routes
//!
//! - `GET /` - First listing page
//! - `GET /page/{n}` - Listing with `n` pages accumulated
//! - `GET /post/{slug}` - Post page, read through the preview cookie when set
//! - `GET /api/preview` - Enter preview mode
//! - `GET /api/exit-preview` - Leave preview mode
//! - `GET /health` - Health check (JSON)
//!
//! Posts are fetched fresh for every request, so paths that were not
//! prebuilt resolve here.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use spacetraveling_cms::{CmsError, ContentClient, PreviewSession};
use spacetraveling_core::config::{is_valid_uid, post_path};
use spacetraveling_generator::{HtmlGenerator, ListAccumulator, html::HtmlError, load_post};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Deepest listing page rendered on demand.
pub const MAX_ON_DEMAND_PAGES: usize = 50;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Unknown post or listing page.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Content store failure other than a missing document.
    #[error("content store error: {0}")]
    Cms(CmsError),

    /// Page rendering failure.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),
}

impl From<CmsError> for ServerError {
    fn from(err: CmsError) -> Self {
        match err {
            CmsError::NotFound(what) => Self::NotFound(what),
            other => Self::Cms(other),
        }
    }
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Cms(_) => StatusCode::BAD_GATEWAY,
            Self::Html(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to visitors.
    fn public_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Página não encontrada.".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Cms(_) => {
                "Não foi possível carregar o conteúdo. Tente novamente mais tarde.".to_string()
            }
            Self::Html(_) => "Não foi possível montar a página.".to_string(),
        }
    }

    fn log(&self) {
        match self {
            Self::NotFound(what) => info!(%what, "not found"),
            Self::BadRequest(msg) => warn!(%msg, "bad request"),
            Self::Cms(err) => error!(error = %err, "content store error"),
            Self::Html(err) => error!(error = %err, "rendering error"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Content store client, shared by every request.
    pub client: Arc<dyn ContentClient>,

    /// Page generator.
    pub generator: Arc<HtmlGenerator>,
}

impl AppState {
    /// Create the state from a client and generator.
    pub fn new(client: Arc<dyn ContentClient>, generator: HtmlGenerator) -> Self {
        Self {
            client,
            generator: Arc::new(generator),
        }
    }

    /// Render an error as a full site page.
    ///
    /// `preview_slug` is set while the visitor is in preview, so the page
    /// keeps its way out of preview mode.
    fn error_page(&self, err: ServerError, preview_slug: Option<&str>) -> Response {
        err.log();
        let status = err.status();
        let rendered = if status == StatusCode::NOT_FOUND {
            self.generator.generate_not_found(preview_slug)
        } else {
            self.generator
                .generate_error(&err.public_message(), preview_slug)
        };

        match rendered {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!(error = %e, "failed to render error page");
                err.into_response()
            }
        }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/page/{n}", get(listing_page))
        .route("/post/{slug}", get(post_page))
        .route("/api/preview", get(enter_preview))
        .route("/api/exit-preview", get(exit_preview))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(State(state): State<AppState>) -> Response {
    render_listing(&state, 1)
        .await
        .unwrap_or_else(|e| state.error_page(e, None))
}

async fn listing_page(State(state): State<AppState>, Path(pages): Path<usize>) -> Response {
    render_listing(&state, pages)
        .await
        .unwrap_or_else(|e| state.error_page(e, None))
}

/// Render the listing with `pages` pages accumulated, following the cursor serially.
async fn render_listing(state: &AppState, pages: usize) -> Result<Response, ServerError> {
    let not_found = || ServerError::NotFound(format!("/page/{pages}"));
    if pages == 0 || pages > MAX_ON_DEMAND_PAGES {
        return Err(not_found());
    }

    let page_size = state.generator.config().cms.page_size;
    let mut list = ListAccumulator::first_page(state.client.as_ref(), page_size).await?;
    if list.load_pages(pages).await? < pages {
        return Err(not_found());
    }

    let html = state.generator.generate_home(list.state(), pages)?;
    Ok(Html(html).into_response())
}

async fn post_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let cookies = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    let session = PreviewSession::from_cookie_header(cookies);

    render_post(&state, &slug, &session)
        .await
        .unwrap_or_else(|e| state.error_page(e, session.is_preview().then_some(slug.as_str())))
}

async fn render_post(
    state: &AppState,
    slug: &str,
    session: &PreviewSession,
) -> Result<Response, ServerError> {
    if !is_valid_uid(slug) {
        return Err(ServerError::NotFound(post_path(slug)));
    }

    let view = load_post(state.client.as_ref(), slug, session).await?;
    let html = state.generator.generate_post(&view)?;

    if view.preview {
        Ok(([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response())
    } else {
        Ok(Html(html).into_response())
    }
}

/// Query parameters of the preview entry link.
#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    token: Option<String>,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

async fn enter_preview(
    State(state): State<AppState>,
    Query(params): Query<PreviewParams>,
) -> Response {
    start_preview(&state, params)
        .await
        .unwrap_or_else(|e| state.error_page(e, None))
}

/// Set the preview cookie and redirect to the previewed document.
async fn start_preview(state: &AppState, params: PreviewParams) -> Result<Response, ServerError> {
    let token = params
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Token de preview ausente.".to_string()))?;

    if !state.client.has_ref(&token).await? {
        return Err(ServerError::BadRequest(
            "Token de preview inválido.".to_string(),
        ));
    }

    let location = match params.document_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let document = state.client.get_by_id(id, Some(&token)).await?;
            if is_valid_uid(&document.uid) {
                post_path(&document.uid)
            } else {
                "/".to_string()
            }
        }
        None => "/".to_string(),
    };

    info!(%location, "entering preview");
    let session = PreviewSession::enter(Some(token));
    Ok((
        [(header::SET_COOKIE, session.set_cookie())],
        Redirect::temporary(&location),
    )
        .into_response())
}

/// Query parameters of the leave-preview link.
#[derive(Debug, Deserialize)]
pub struct ExitParams {
    slug: Option<String>,
}

async fn exit_preview(Query(params): Query<ExitParams>) -> Response {
    let location = params
        .slug
        .filter(|slug| is_valid_uid(slug))
        .map(|slug| post_path(&slug))
        .unwrap_or_else(|| "/".to_string());

    info!(%location, "leaving preview");
    (
        [(header::SET_COOKIE, PreviewSession::clear_cookie())],
        Redirect::temporary(&location),
    )
        .into_response()
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "spacetraveling",
        version: env!("CARGO_PKG_VERSION"),
    })
}
