//! Serve command - renders pages on demand

use std::{net::SocketAddr, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use spacetraveling_generator::HtmlGenerator;
use tokio::net::TcpListener;

use super::load_config;
use crate::server::{AppState, router};

/// Run the serve command.
///
/// `bind` replaces the configured address; `port` then replaces its port.
pub async fn run(
    config_path: &Path,
    bind: Option<&str>,
    port: Option<u16>,
    fixtures: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let addr = listen_addr(bind.unwrap_or(&config.server.bind_addr), port)?;

    let client = crate::content_client(&config, fixtures)
        .wrap_err("Failed to create content client")?;
    let generator = HtmlGenerator::new(config).wrap_err("Failed to set up page generator")?;
    let app = router(AppState::new(client, generator));

    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Server running at http://{addr}");
    println!("  Press Ctrl+C to stop");
    println!();
    tracing::info!(%addr, "starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolve the listen address from the bind string and an optional port override.
pub fn listen_addr(bind: &str, port: Option<u16>) -> Result<SocketAddr> {
    let mut addr: SocketAddr = bind
        .parse()
        .wrap_err_with(|| format!("Invalid bind address: {bind}"))?;
    if let Some(port) = port {
        addr.set_port(port);
    }
    Ok(addr)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
