//! spacetraveling CLI Library
//!
//! Command implementations and the on-demand HTTP server behind the
//! `spacetraveling` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, serve, check)
//! - [`server`] - Request handlers rendering pages from the content store
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use spacetraveling::cmd;
//!
//! # async fn run() -> color_eyre::eyre::Result<()> {
//! // Build the static site from the configured CMS
//! cmd::build::run(Path::new("config.toml"), None, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod server;

use std::{path::Path, sync::Arc};

use spacetraveling_cms::{ContentClient, MemoryStore, PrismicClient};
// Re-export core types for convenience
pub use spacetraveling_core::Config;
pub use spacetraveling_generator::{BuildStats, Builder};

/// Construct the content client for this process.
///
/// A fixtures file selects the in-memory store; otherwise the configured CMS
/// endpoint is used.
pub fn content_client(
    config: &Config,
    fixtures: Option<&Path>,
) -> spacetraveling_cms::Result<Arc<dyn ContentClient>> {
    match fixtures {
        Some(path) => {
            let store = MemoryStore::from_file(path)?;
            tracing::info!(path = %path.display(), posts = store.len(), "using fixtures");
            Ok(Arc::new(store))
        }
        None => {
            let client = PrismicClient::new(&config.cms)?;
            tracing::info!(endpoint = client.endpoint(), "using CMS");
            Ok(Arc::new(client))
        }
    }
}

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// spacetraveling::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
