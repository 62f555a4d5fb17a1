//! Build orchestration.
//!
//! Prerenders the listing pages and every post the paths query returns.
//! Posts that fail to load are skipped and left to on-demand rendering.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use rayon::prelude::*;
use spacetraveling_cms::{CmsError, ContentClient, PreviewSession};
use spacetraveling_core::{Config, config::is_valid_uid};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    html::{HtmlError, HtmlGenerator},
    pagination::{ListAccumulator, LoadMore},
    post::{PostView, load_post},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTML generation error.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),

    /// Content store error.
    #[error("content store error: {0}")]
    Cms(#[from] CmsError),

    /// A post uid that cannot be used as a path segment.
    #[error("post uid is not a plain slug: {0:?}")]
    InvalidUid(String),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of listing pages generated.
    pub list_pages: usize,

    /// Number of post pages generated.
    pub posts: usize,

    /// Number of posts that could not be prerendered.
    pub skipped: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Site builder that orchestrates the build process.
pub struct Builder<'a, C: ContentClient + ?Sized> {
    config: Config,
    client: &'a C,
    output_dir: PathBuf,
}

impl<'a, C: ContentClient + ?Sized> Builder<'a, C> {
    /// Create a new builder.
    pub fn new(config: Config, client: &'a C, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            client,
            output_dir: output_dir.into(),
        }
    }

    /// Execute the full build process.
    ///
    /// Only a failure to fetch the first listing page or to write output
    /// aborts the build.
    pub async fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(output = %self.output_dir.display(), "starting build");

        let generator = HtmlGenerator::new(self.config.clone())?;

        // 1. Clean output directory
        self.clean_output()?;

        // 2. Listing pages
        stats.list_pages = self.generate_list_pages(&generator).await?;

        // 3. Post pages
        let (views, failed) = self.fetch_posts().await;
        stats.skipped = failed;
        let (written, render_failed) = self.generate_posts(&generator, &views);
        stats.posts = written;
        stats.skipped += render_failed;

        // 4. Not-found fallback
        write_page(&self.output_dir.join("404.html"), &generator.generate_not_found(None)?)?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            list_pages = stats.list_pages,
            posts = stats.posts,
            skipped = stats.skipped,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Clean the output directory.
    fn clean_output(&self) -> Result<()> {
        if self.output_dir.exists() {
            debug!(dir = %self.output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Render `index.html` and the accumulated `page/{n}` pages.
    async fn generate_list_pages(&self, generator: &HtmlGenerator) -> Result<usize> {
        let max_pages = self.config.build.max_list_pages.max(1);
        let mut list = ListAccumulator::first_page(self.client, self.config.cms.page_size).await?;

        loop {
            let page_number = list.pages_loaded();
            let html = generator.generate_home(list.state(), page_number)?;
            write_page(&generator.list_output_path(&self.output_dir, page_number), &html)?;

            if page_number >= max_pages {
                break;
            }

            match list.load_more().await {
                Ok(LoadMore::Appended(_)) => {}
                Ok(LoadMore::Exhausted) => break,
                Err(e) => {
                    warn!(page = page_number + 1, error = %e, "stopping listing prerender");
                    break;
                }
            }
        }

        Ok(list.pages_loaded())
    }

    /// Fetch every prerenderable post. Returns the views and the failure count.
    async fn fetch_posts(&self) -> (Vec<PostView>, usize) {
        let uids = match self.client.query_uids(self.config.cms.paths_page_size).await {
            Ok(uids) => uids,
            Err(e) => {
                warn!(error = %e, "could not list post paths, posts will render on demand");
                return (Vec::new(), 0);
            }
        };

        info!(count = uids.len(), "fetching posts");

        let session = PreviewSession::Normal;
        let mut views = Vec::with_capacity(uids.len());
        let mut failed = 0;
        for uid in &uids {
            if !is_valid_uid(uid) {
                warn!(uid = %uid, "skipping post with unusable uid");
                failed += 1;
                continue;
            }

            match load_post(self.client, uid, &session).await {
                Ok(view) => views.push(view),
                Err(e) => {
                    warn!(uid = %uid, error = %e, "skipping post");
                    failed += 1;
                }
            }
        }

        (views, failed)
    }

    /// Render and write post pages in parallel. Returns written and failed counts.
    fn generate_posts(&self, generator: &HtmlGenerator, views: &[PostView]) -> (usize, usize) {
        let results: Vec<_> = views
            .par_iter()
            .map(|view| {
                let html = generator.generate_post(view)?;
                let uid = &view.document.uid;
                let output_path = generator
                    .post_output_path(&self.output_dir, uid)
                    .ok_or_else(|| BuildError::InvalidUid(uid.clone()))?;
                write_page(&output_path, &html)?;

                debug!(path = %output_path.display(), "wrote post");
                Ok::<_, BuildError>(())
            })
            .collect();

        let mut written = 0;
        let mut failed = 0;
        for (view, result) in views.iter().zip(results) {
            match result {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!(uid = %view.document.uid, error = %e, "failed to generate post");
                    failed += 1;
                }
            }
        }
        (written, failed)
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(())
}
